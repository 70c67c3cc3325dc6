//! Crawl engine: frontier, rate limiter, fetch-and-process pipeline, and
//! the orchestrator that ties them together behind one [`Crawler::crawl`]
//! entry point (C6-C8).

pub mod context;
pub mod frontier;
pub mod pipeline;
pub mod orchestrator;
pub mod rate_limiter;
pub mod stats;
pub mod types;

pub use context::{CrawlerContext, CrawlerContextBuilder};
pub use frontier::{Frontier, FrontierEntry};
pub use orchestrator::Crawler;
pub use pipeline::PipelineOutcome;
pub use rate_limiter::RateLimiter;
pub use stats::AtomicStats;
pub use types::{CrawlResult, CrawlStats, CrawlTarget, Issue};
