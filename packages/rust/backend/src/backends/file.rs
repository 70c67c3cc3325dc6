//! `file:` scheme backend (§4.7's file-scheme branch).

use std::time::Instant;

use async_trait::async_trait;

use crate::backend::{BackendCapabilities, FetchBackend, FetchConfig, FetchRequest, FetchResponse};

/// Reads documents directly off the local filesystem. Used for `file://`
/// seeds and for crawling pre-mirrored documentation trees without a
/// network hop.
pub struct LocalFileBackend;

impl LocalFileBackend {
    pub fn new() -> Self {
        Self
    }

    fn path_from_url(url: &mirrordocs_url::URLInfo) -> Option<std::path::PathBuf> {
        let as_url = url.as_url()?;
        as_url.to_file_path().ok()
    }
}

impl Default for LocalFileBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FetchBackend for LocalFileBackend {
    async fn fetch(&self, request: &FetchRequest, _config: &FetchConfig) -> FetchResponse {
        let started = Instant::now();
        let url = request.url.clone();

        let Some(path) = Self::path_from_url(&url) else {
            return FetchResponse {
                status: 0,
                final_url: url,
                headers: Default::default(),
                body: Vec::new(),
                content_type: None,
                error_reason: Some("file_not_found: not a valid file path".to_string()),
                duration: started.elapsed(),
            };
        };

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return FetchResponse {
                    status: 0,
                    final_url: url,
                    headers: Default::default(),
                    body: Vec::new(),
                    content_type: None,
                    error_reason: Some(format!("file_not_found: {}", path.display())),
                    duration: started.elapsed(),
                };
            }
            Err(e) => return FetchResponse::transport_error(url, format!("file_read_error: {e}"), started.elapsed()),
        };

        if metadata.is_dir() {
            return FetchResponse {
                status: 0,
                final_url: url,
                headers: Default::default(),
                body: Vec::new(),
                content_type: None,
                error_reason: Some(format!("file_is_directory: {}", path.display())),
                duration: started.elapsed(),
            };
        }

        let body = match tokio::fs::read(&path).await {
            Ok(body) => body,
            Err(e) => return FetchResponse::transport_error(url, format!("file_read_error: {e}"), started.elapsed()),
        };

        let content_type = guess_content_type(&path);

        FetchResponse {
            status: 200,
            final_url: url,
            headers: Default::default(),
            body,
            content_type,
            error_reason: None,
            duration: started.elapsed(),
        }
    }

    fn name(&self) -> &str {
        "file"
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            html: true,
            renders_js: false,
        }
    }
}

fn guess_content_type(path: &std::path::Path) -> Option<String> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => Some("text/html".to_string()),
        Some("md") | Some("markdown") => Some("text/markdown".to_string()),
        Some("txt") => Some("text/plain".to_string()),
        Some("json") => Some("application/json".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_existing_file() {
        let dir = tempfile_dir();
        let file_path = dir.join("page.html");
        tokio::fs::write(&file_path, "<html></html>").await.unwrap();

        let url = mirrordocs_url::URLInfo::parse(&format!("file://{}", file_path.display()), None);
        let backend = LocalFileBackend::new();
        let response = backend.fetch(&FetchRequest::new(url), &FetchConfig::default()).await;

        assert_eq!(response.status, 200);
        assert_eq!(response.content_type.as_deref(), Some("text/html"));
        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn missing_file_reports_not_found() {
        let url = mirrordocs_url::URLInfo::parse("file:///nonexistent/path/for/sure.html", None);
        let backend = LocalFileBackend::new();
        let response = backend.fetch(&FetchRequest::new(url), &FetchConfig::default()).await;

        assert_eq!(response.status, 0);
        assert!(response.error_reason.unwrap().starts_with("file_not_found"));
    }

    #[tokio::test]
    async fn directory_is_reported_distinctly() {
        let dir = tempfile_dir();
        let url = mirrordocs_url::URLInfo::parse(&format!("file://{}", dir.display()), None);
        let backend = LocalFileBackend::new();
        let response = backend.fetch(&FetchRequest::new(url), &FetchConfig::default()).await;

        assert_eq!(response.status, 0);
        assert!(response.error_reason.unwrap().starts_with("file_is_directory"));
        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    fn tempfile_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("mirrordocs-file-backend-test-{:?}", std::thread::current().id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}
