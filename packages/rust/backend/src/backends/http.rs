//! HTTP(S) fetch backend, grounded on the teacher's `Crawler::new`/
//! `fetch_page` client construction in `crawler/src/engine.rs`.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;

use crate::backend::{BackendCapabilities, FetchBackend, FetchConfig, FetchRequest, FetchResponse};

/// Fetches `http`/`https` URLs with a pooled [`reqwest::Client`].
///
/// Transport failures (DNS, TLS, connect, timeout, body read) are caught
/// and folded into a `status: 0` [`FetchResponse`] rather than propagated,
/// per §4.5 — the pipeline's retry loop only ever looks at `status`.
pub struct HttpBackend {
    client: Client,
}

impl HttpBackend {
    pub fn new(config: &FetchConfig) -> mirrordocs_shared::Result<Self> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects as usize))
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls);

        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| mirrordocs_shared::CrawlError::backend_init("http", e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| mirrordocs_shared::CrawlError::backend_init("http", e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FetchBackend for HttpBackend {
    async fn fetch(&self, request: &FetchRequest, config: &FetchConfig) -> FetchResponse {
        let started = Instant::now();
        let url = request.url.clone();

        let mut builder = self.client.get(request.url.raw());
        let accept = request
            .hint_content_type
            .clone()
            .or_else(|| config.accept_content_types.clone());
        if let Some(accept) = accept {
            builder = builder.header(reqwest::header::ACCEPT, accept);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) if e.is_redirect() => {
                return FetchResponse::transport_error(url, "redirect_limit: too many redirects", started.elapsed());
            }
            Err(e) => return FetchResponse::transport_error(url, e.to_string(), started.elapsed()),
        };

        let status = response.status().as_u16();
        let final_url = mirrordocs_url::URLInfo::parse(response.url().as_str(), None);
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
            .collect();

        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => return FetchResponse::transport_error(final_url, e.to_string(), started.elapsed()),
        };

        FetchResponse {
            status,
            final_url,
            headers,
            body,
            content_type,
            error_reason: None,
            duration: started.elapsed(),
        }
    }

    fn name(&self) -> &str {
        "http"
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
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetches_successful_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/docs"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>hi</html>").insert_header("content-type", "text/html"))
            .mount(&server)
            .await;

        let config = FetchConfig::default();
        let backend = HttpBackend::new(&config).expect("client builds");
        let url = mirrordocs_url::URLInfo::parse_allow_local(&format!("{}/docs", server.uri()), None);
        let request = FetchRequest::new(url);

        let response = backend.fetch(&request, &config).await;
        assert_eq!(response.status, 200);
        assert!(response.is_success());
        assert_eq!(response.content_type.as_deref(), Some("text/html"));
        assert_eq!(response.body, b"<html>hi</html>");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let config = FetchConfig {
            timeout: std::time::Duration::from_millis(200),
            ..FetchConfig::default()
        };
        let backend = HttpBackend::new(&config).expect("client builds");
        let url = mirrordocs_url::URLInfo::parse_allow_local("http://127.0.0.1:1", None);
        let request = FetchRequest::new(url);

        let response = backend.fetch(&request, &config).await;
        assert_eq!(response.status, 0);
        assert!(response.error_reason.is_some());
        assert!(response.is_retryable_status());
    }

    #[tokio::test]
    async fn server_error_is_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let config = FetchConfig::default();
        let backend = HttpBackend::new(&config).expect("client builds");
        let url = mirrordocs_url::URLInfo::parse_allow_local(&format!("{}/flaky", server.uri()), None);
        let response = backend.fetch(&FetchRequest::new(url), &config).await;
        assert_eq!(response.status, 503);
        assert!(response.is_retryable_status());
        assert!(!response.is_permanent_failure());
    }
}
