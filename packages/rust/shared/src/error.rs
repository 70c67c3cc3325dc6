//! Error types for mirrordocs.
//!
//! Library crates use [`CrawlError`] via `thiserror`. The CLI wraps this
//! with `color-eyre` for rich diagnostics. Per-URL crawl failures are not
//! represented here — those are recoverable `Issue` records attached to a
//! `CrawlResult`, never exceptions (see `mirrordocs_crawler::Issue`).

use std::path::PathBuf;

/// Top-level error type for ambient (non-per-URL) failures.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Invalid crawl target (bad seed, contradictory limits, etc.).
    #[error("invalid target: {message}")]
    InvalidTarget { message: String },

    /// Backend construction failed at registration time.
    #[error("backend init error: {backend}: {message}")]
    BackendInit { backend: String, message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CrawlError>;

impl CrawlError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an invalid-target error from any displayable message.
    pub fn invalid_target(msg: impl Into<String>) -> Self {
        Self::InvalidTarget {
            message: msg.into(),
        }
    }

    /// Create a backend-init error.
    pub fn backend_init(backend: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::BackendInit {
            backend: backend.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
