//! CLI argument definitions, backend wiring, and command dispatch.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;
use mirrordocs_backend::{BackendCriteria, HttpBackend, LocalFileBackend};
use mirrordocs_crawler::{Crawler, CrawlerContextBuilder, CrawlTarget};
use mirrordocs_shared::{CrawlerConfig, load_config};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// mirrordocs — crawl documentation sites into structured, quality-checked pages.
#[derive(Parser)]
#[command(
    name = "mirrordocs",
    version,
    about = "Crawl documentation into structured, quality-checked pages.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Seed URL (or library/project name) to start crawling from. May be
    /// repeated; every seed that resolves is enqueued at depth 0.
    #[arg(long = "seed", required = true)]
    pub seeds: Vec<String>,

    /// Maximum link-following depth from any seed.
    #[arg(long, default_value_t = 3)]
    pub max_depth: u32,

    /// Maximum number of pages to crawl across all seeds.
    #[arg(long, default_value_t = 500)]
    pub max_pages: usize,

    /// Number of concurrent fetch workers. Defaults to the engine config's
    /// `concurrent_requests`.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Follow links that leave the seed's registered domain.
    #[arg(long)]
    pub follow_external: bool,

    /// Only enqueue paths matching at least one of these substrings
    /// (repeatable).
    #[arg(long = "allow-pattern")]
    pub allow_patterns: Vec<String>,

    /// Never enqueue paths containing any of these substrings (repeatable).
    #[arg(long = "deny-pattern")]
    pub deny_patterns: Vec<String>,

    /// Global crawl timeout, in seconds. Defaults to the engine config's
    /// `crawl_timeout_secs`.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Restrict fetching to this backend only (repeatable): http, file,
    /// archive, headless (only when built with the `headless` feature).
    /// Defaults to all non-optional backends; `headless` is always opt-in.
    #[arg(long = "backend")]
    pub backends: Vec<String>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "mirrordocs=info",
        1 => "mirrordocs=debug",
        _ => "mirrordocs=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run one crawl per the parsed CLI flags, printing the resulting
/// `CrawlResult` as JSON. Exit codes per the CLI contract: 0 on completion
/// (even with per-page failures recorded as issues), 2 on invalid
/// arguments, 3 if the crawl hit its global timeout.
pub(crate) async fn run(cli: Cli) -> Result<ExitCode> {
    if cli.max_pages == 0 {
        return invalid_args("--max-pages must be greater than zero");
    }
    if let Some(0) = cli.concurrency {
        return invalid_args("--concurrency must be greater than zero");
    }
    if let Some(backend) = cli.backends.iter().find(|b| !KNOWN_BACKENDS.contains(&b.as_str())) {
        return invalid_args(&format!("unknown backend '{backend}': expected one of {KNOWN_BACKENDS:?}"));
    }

    let app_config = load_config()?;
    let mut engine_config = CrawlerConfig::from(&app_config);
    if let Some(timeout) = cli.timeout {
        engine_config.crawl_timeout = Duration::from_secs(timeout);
    }
    if let Some(concurrency) = cli.concurrency {
        engine_config.concurrent_requests = concurrency;
    }

    let context = build_context(&cli, engine_config).await?;
    let crawler = Crawler::new(context);

    for seed in &cli.seeds {
        info!(seed, "starting crawl");
        let target = build_target(&cli, seed.clone());
        let result = crawler.crawl(target).await;

        let timed_out = result.issues.iter().any(|issue| issue.kind == "crawl_timeout");

        println!("{}", serde_json::to_string_pretty(&result)?);

        if timed_out {
            return Ok(ExitCode::from(3));
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(feature = "headless")]
const KNOWN_BACKENDS: &[&str] = &["http", "file", "archive", "headless"];
#[cfg(not(feature = "headless"))]
const KNOWN_BACKENDS: &[&str] = &["http", "file", "archive"];

fn invalid_args(message: &str) -> Result<ExitCode> {
    eprintln!("error: {message}");
    Ok(ExitCode::from(2))
}

fn wants_backend(cli: &Cli, name: &str) -> bool {
    cli.backends.is_empty() || cli.backends.iter().any(|b| b == name)
}

async fn build_context(cli: &Cli, engine_config: CrawlerConfig) -> Result<mirrordocs_crawler::CrawlerContext> {
    let mut builder = CrawlerContextBuilder::new(engine_config.clone());

    if wants_backend(cli, "http") {
        let fetch_config = mirrordocs_backend::FetchConfig {
            timeout: engine_config.request_timeout,
            verify_tls: true,
            user_agent: engine_config.user_agent.clone(),
            max_redirects: engine_config.max_redirects,
            accept_content_types: None,
            proxy: None,
        };
        let http = HttpBackend::new(&fetch_config)?;
        builder = builder.register_backend("http", Arc::new(http), BackendCriteria::wildcard(0).with_capabilities(mirrordocs_backend::BackendCapabilities { html: true, renders_js: false }));
    }

    if wants_backend(cli, "file") {
        builder = builder.register_backend("file", Arc::new(LocalFileBackend::new()), BackendCriteria::wildcard(-50));
    }

    if wants_backend(cli, "archive") {
        builder = builder.register_backend("archive", Arc::new(mirrordocs_backend::ArchiveBackend::new()), BackendCriteria::wildcard(-100));
    }

    #[cfg(feature = "headless")]
    if cli.backends.iter().any(|b| b == "headless") {
        let headless = mirrordocs_backend::HeadlessBackend::launch().await?;
        builder = builder.register_backend(
            "headless",
            Arc::new(headless),
            BackendCriteria::wildcard(10).with_capabilities(mirrordocs_backend::BackendCapabilities { html: true, renders_js: true }),
        );
    }

    Ok(builder.build())
}

fn build_target(cli: &Cli, seed: String) -> CrawlTarget {
    let mut target = CrawlTarget::new(seed);
    target.max_depth = cli.max_depth;
    target.max_pages = cli.max_pages;
    target.follow_external = cli.follow_external;
    target.include_patterns = cli.allow_patterns.clone();
    target.exclude_patterns = cli.deny_patterns.clone();
    target.concurrency_override = cli.concurrency;
    target
}
