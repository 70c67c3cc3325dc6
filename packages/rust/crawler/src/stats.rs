//! Concurrency-safe counters for one `crawl()` call (§5: "atomic increments
//! or a single lock"). Snapshotted into a [`crate::types::CrawlStats`] only
//! at the termination point, which is what callers actually observe.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

use crate::types::CrawlStats;

#[derive(Default)]
pub struct AtomicStats {
    pages_crawled: AtomicU64,
    successful_crawls: AtomicU64,
    failed_crawls: AtomicU64,
    bytes_processed: AtomicU64,
    retries_used: AtomicU64,
    skipped_content_type: AtomicU64,
    redirected_to_visited: AtomicU64,
}

impl AtomicStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_pages_crawled(&self) {
        self.pages_crawled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_successful_crawls(&self) {
        self.successful_crawls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failed_crawls(&self) {
        self.failed_crawls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_bytes_processed(&self, n: u64) {
        self.bytes_processed.fetch_add(n, Ordering::Relaxed);
    }

    pub fn inc_retries_used(&self) {
        self.retries_used.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_skipped_content_type(&self) {
        self.skipped_content_type.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_redirected_to_visited(&self) {
        self.redirected_to_visited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn pages_crawled(&self) -> u64 {
        self.pages_crawled.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> CrawlStats {
        CrawlStats {
            pages_crawled: self.pages_crawled.load(Ordering::Relaxed),
            successful_crawls: self.successful_crawls.load(Ordering::Relaxed),
            failed_crawls: self.failed_crawls.load(Ordering::Relaxed),
            bytes_processed: self.bytes_processed.load(Ordering::Relaxed),
            retries_used: self.retries_used.load(Ordering::Relaxed),
            skipped_content_type: self.skipped_content_type.load(Ordering::Relaxed),
            redirected_to_visited: self.redirected_to_visited.load(Ordering::Relaxed),
            start_time,
            end_time: Some(end_time),
        }
    }
}
