//! Fetch backend interface (C5) and its request/response value types.
//!
//! `FetchBackend` is expressed with `async_trait` so it can be stored as a
//! `Box<dyn FetchBackend>`/`Arc<dyn FetchBackend>` trait object — plain
//! `async fn` in traits is not yet dyn-compatible on stable Rust, and
//! `async_trait` is the ecosystem's standard workaround for exactly this
//! shape (a registry of interchangeable async implementations).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use mirrordocs_url::URLInfo;

/// Per-backend hints attached to a fetch request (e.g. a content-type the
/// caller expects, used by some backends to set an `Accept` header).
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: URLInfo,
    pub hint_content_type: Option<String>,
}

impl FetchRequest {
    pub fn new(url: URLInfo) -> Self {
        Self {
            url,
            hint_content_type: None,
        }
    }

    pub fn with_hint_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.hint_content_type = Some(content_type.into());
        self
    }
}

/// Configuration recognized by HTTP-family backends (§4.5).
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub verify_tls: bool,
    pub user_agent: String,
    pub max_redirects: u32,
    pub accept_content_types: Option<String>,
    pub proxy: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            verify_tls: true,
            user_agent: concat!("mirrordocs/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: 5,
            accept_content_types: None,
            proxy: None,
        }
    }
}

/// The outcome of one fetch attempt. Never represents failure through a
/// `Result` — transport errors are encoded as `status == 0` with
/// `error_reason` set, so the C7 retry loop can branch on `status`
/// uniformly regardless of whether the failure was local or remote.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status code, or `0` for a transport-level failure (never
    /// reached the server, TLS failure, DNS failure, etc).
    pub status: u16,
    /// The URL the response actually came from, after any redirects the
    /// backend followed internally. Not yet re-normalized by C1 — the
    /// pipeline (C7) is responsible for that per §4.5.
    pub final_url: URLInfo,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub content_type: Option<String>,
    pub error_reason: Option<String>,
    pub duration: Duration,
}

impl FetchResponse {
    pub fn transport_error(request_url: URLInfo, reason: impl Into<String>, duration: Duration) -> Self {
        Self {
            status: 0,
            final_url: request_url,
            headers: HashMap::new(),
            body: Vec::new(),
            content_type: None,
            error_reason: Some(reason.into()),
            duration,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_retryable_status(&self) -> bool {
        self.status == 0 || self.status == 408 || self.status == 429 || self.status >= 500
    }

    pub fn is_permanent_failure(&self) -> bool {
        matches!(self.status, 400 | 401 | 403 | 404 | 410)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}

/// Capability flags a backend can advertise to the selector (§4.4).
#[derive(Debug, Clone, Copy, Default)]
pub struct BackendCapabilities {
    pub html: bool,
    pub renders_js: bool,
}

/// A pluggable fetcher capable of turning a `URLInfo` into a `FetchResponse`.
#[async_trait]
pub trait FetchBackend: Send + Sync {
    /// Retrieve bytes + metadata for one URL. Never throws — every error is
    /// encoded in the returned `FetchResponse`.
    async fn fetch(&self, request: &FetchRequest, config: &FetchConfig) -> FetchResponse;

    /// Release pooled connections / child processes. Errors are reported
    /// as `Err(String)` so `BackendRegistry::close_all` can collect them
    /// into a combined report rather than aborting the shutdown sequence.
    async fn close(&self) -> Result<(), String> {
        Ok(())
    }

    fn name(&self) -> &str;

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities::default()
    }
}
