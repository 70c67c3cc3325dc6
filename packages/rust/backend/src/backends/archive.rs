//! In-memory archive backend — serves previously-captured responses
//! without re-fetching, keyed on normalized URL.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::backend::{BackendCapabilities, FetchBackend, FetchConfig, FetchRequest, FetchResponse};

#[derive(Clone)]
struct ArchivedEntry {
    status: u16,
    body: Vec<u8>,
    content_type: Option<String>,
}

/// Serves bodies captured earlier in the crawl (or pre-seeded by a caller)
/// instead of performing a live fetch. Entries are keyed by the request
/// URL's normalized form so repeated fetches of equivalent URLs hit.
#[derive(Default)]
pub struct ArchiveBackend {
    entries: DashMap<String, ArchivedEntry>,
}

impl ArchiveBackend {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Seed the archive with a response for `url`, as if it had been
    /// fetched and cached previously.
    pub fn store(&self, url: &mirrordocs_url::URLInfo, status: u16, body: Vec<u8>, content_type: Option<String>) {
        self.entries.insert(
            url.normalized_url().to_string(),
            ArchivedEntry {
                status,
                body,
                content_type,
            },
        );
    }

    pub fn contains(&self, url: &mirrordocs_url::URLInfo) -> bool {
        self.entries.contains_key(url.normalized_url())
    }
}

#[async_trait]
impl FetchBackend for ArchiveBackend {
    async fn fetch(&self, request: &FetchRequest, _config: &FetchConfig) -> FetchResponse {
        let started = Instant::now();
        let url = request.url.clone();

        match self.entries.get(url.normalized_url()) {
            Some(entry) => FetchResponse {
                status: entry.status,
                final_url: url,
                headers: Default::default(),
                body: entry.body.clone(),
                content_type: entry.content_type.clone(),
                error_reason: None,
                duration: started.elapsed(),
            },
            None => FetchResponse::transport_error(url, "archive_miss: no archived entry", Duration::ZERO),
        }
    }

    fn name(&self) -> &str {
        "archive"
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            html: true,
            renders_js: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_a_stored_entry() {
        let backend = ArchiveBackend::new();
        let url = mirrordocs_url::URLInfo::parse("https://docs.example.com/guide", None);
        backend.store(&url, 200, b"cached body".to_vec(), Some("text/html".into()));

        let response = backend.fetch(&FetchRequest::new(url), &FetchConfig::default()).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"cached body");
    }

    #[tokio::test]
    async fn missing_entry_is_a_transport_error() {
        let backend = ArchiveBackend::new();
        let url = mirrordocs_url::URLInfo::parse("https://docs.example.com/unseen", None);
        let response = backend.fetch(&FetchRequest::new(url), &FetchConfig::default()).await;
        assert_eq!(response.status, 0);
        assert!(response.error_reason.unwrap().starts_with("archive_miss"));
    }
}
