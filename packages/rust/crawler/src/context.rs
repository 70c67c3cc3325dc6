//! `CrawlerContext`: every piece of shared/global state the source crawler
//! kept as module-level singletons, lifted into one explicit value threaded
//! to the orchestrator and its workers (§9's binding re-architecture
//! directive — no global mutable singletons, no monkey-patched rate
//! limiters).

use std::sync::Arc;

use mirrordocs_backend::{BackendCriteria, BackendRegistry, BackendSelector, FetchBackend, FetchConfig};
use mirrordocs_content::{ContentProcessor, HtmlContentProcessor};
use mirrordocs_discovery::{HeuristicProjectDiscovery, ProjectDiscovery};
use mirrordocs_quality::{HeuristicQualityChecker, QualityChecker};
use mirrordocs_shared::CrawlerConfig;
use tokio::sync::Semaphore;

use crate::rate_limiter::RateLimiter;
use crate::types::CrawlTarget;

/// Every collaborator and piece of shared state a crawl needs, owned by the
/// orchestrator and handed to workers as borrowed references (§9's
/// "cycles in ownership" rule: workers hold only borrowed references plus
/// their own cancellation token).
pub struct CrawlerContext {
    pub registry: BackendRegistry,
    pub selector: BackendSelector,
    pub rate_limiter: RateLimiter,
    pub content_processor: Arc<dyn ContentProcessor>,
    pub quality_checker: Arc<dyn QualityChecker>,
    pub discovery: Arc<dyn ProjectDiscovery>,
    pub config: CrawlerConfig,
    /// Bounds concurrent CPU-heavy `ContentProcessor::process` calls,
    /// independently of `concurrent_requests` (§5).
    processing_semaphore: Semaphore,
}

impl CrawlerContext {
    pub fn processing_semaphore(&self) -> &Semaphore {
        &self.processing_semaphore
    }

    /// Build a [`FetchConfig`] for one crawl, combining engine-wide config
    /// with the per-target content-type allow-list (sent as the `Accept`
    /// header hint).
    pub fn fetch_config(&self, target: &CrawlTarget) -> FetchConfig {
        FetchConfig {
            timeout: self.config.request_timeout,
            verify_tls: true,
            user_agent: self.config.user_agent.clone(),
            max_redirects: self.config.max_redirects,
            accept_content_types: if target.content_types.is_empty() {
                None
            } else {
                Some(target.content_types.join(", "))
            },
            proxy: None,
        }
    }
}

/// Builder for [`CrawlerContext`]. Registration only makes sense before the
/// context is shared across workers, so it is exclusive to this stage —
/// matching §5's "registration is exclusive" rule for the registry.
pub struct CrawlerContextBuilder {
    registry: BackendRegistry,
    config: CrawlerConfig,
    content_processor: Arc<dyn ContentProcessor>,
    quality_checker: Arc<dyn QualityChecker>,
    discovery: Arc<dyn ProjectDiscovery>,
}

impl CrawlerContextBuilder {
    pub fn new(config: CrawlerConfig) -> Self {
        Self {
            registry: BackendRegistry::new(),
            config,
            content_processor: Arc::new(HtmlContentProcessor),
            quality_checker: Arc::new(HeuristicQualityChecker),
            discovery: Arc::new(HeuristicProjectDiscovery),
        }
    }

    /// Register a fetch backend (C3's `register_backend`).
    pub fn register_backend(mut self, name: impl Into<String>, backend: Arc<dyn FetchBackend>, criteria: BackendCriteria) -> Self {
        self.registry.register(name, backend, criteria);
        self
    }

    pub fn content_processor(mut self, processor: Arc<dyn ContentProcessor>) -> Self {
        self.content_processor = processor;
        self
    }

    pub fn quality_checker(mut self, checker: Arc<dyn QualityChecker>) -> Self {
        self.quality_checker = checker;
        self
    }

    pub fn discovery(mut self, discovery: Arc<dyn ProjectDiscovery>) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn build(self) -> CrawlerContext {
        let rate_limiter = RateLimiter::new(self.config.requests_per_second, self.config.burst);
        let processing_semaphore = Semaphore::new(self.config.processing_concurrency.max(1));
        CrawlerContext {
            registry: self.registry,
            selector: BackendSelector::new(),
            rate_limiter,
            content_processor: self.content_processor,
            quality_checker: self.quality_checker,
            discovery: self.discovery,
            config: self.config,
            processing_semaphore,
        }
    }
}
