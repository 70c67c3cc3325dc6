//! Per-crawl target configuration and crawl-result value types.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Configuration of one crawl. Unlike [`mirrordocs_shared::CrawlerConfig`]
/// (engine-wide, loaded from a config file, reusable across crawls), this
/// has no sensible file-level default — every field is per-invocation.
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    /// Either a URL or, when resolved via `ProjectDiscovery`, a library name.
    pub seed: String,
    pub max_depth: u32,
    pub max_pages: usize,
    pub allowed_path_prefixes: Vec<String>,
    pub excluded_path_prefixes: Vec<String>,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub content_types: Vec<String>,
    pub follow_external: bool,
    pub follow_external_subdomains: bool,
    pub concurrency_override: Option<usize>,
}

impl CrawlTarget {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            max_depth: 3,
            max_pages: 500,
            allowed_path_prefixes: Vec::new(),
            excluded_path_prefixes: Vec::new(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            content_types: Vec::new(),
            follow_external: false,
            follow_external_subdomains: false,
            concurrency_override: None,
        }
    }
}

/// A non-fatal, per-URL record. Per §7, these are data attached to a
/// [`CrawlResult`], never exceptions raised out of the crawl.
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub kind: String,
    pub url: String,
    pub message: String,
    pub backend: Option<String>,
}

impl Issue {
    pub fn new(kind: impl Into<String>, url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            url: url.into(),
            message: message.into(),
            backend: None,
        }
    }

    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }
}

/// Mutable counters tracked for the lifetime of one `crawl()` call.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlStats {
    pub pages_crawled: u64,
    pub successful_crawls: u64,
    pub failed_crawls: u64,
    pub bytes_processed: u64,
    pub retries_used: u64,
    pub skipped_content_type: u64,
    pub redirected_to_visited: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl CrawlStats {
    pub fn started(start_time: DateTime<Utc>) -> Self {
        Self {
            pages_crawled: 0,
            successful_crawls: 0,
            failed_crawls: 0,
            bytes_processed: 0,
            retries_used: 0,
            skipped_content_type: 0,
            redirected_to_visited: 0,
            start_time,
            end_time: None,
        }
    }
}

/// The output of one `crawl()` call.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlResult {
    pub stats: CrawlStats,
    pub pages: Vec<mirrordocs_content::ProcessedPage>,
    pub issues: Vec<Issue>,
    pub visited_count: usize,
    pub per_host_requests: std::collections::HashMap<String, u64>,
}
