//! Headless-browser fetch backend (feature `headless`).
//!
//! Cross-grounded on the browser-launch shape in the `citescrape` example
//! pack (`chromiumoxide::Browser::launch` + a spawned handler-event task),
//! pared down to launch/navigate/read-rendered-HTML only — no stealth
//! injection, fingerprint evasion, or screenshot capture.

use std::time::Instant;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::sync::Mutex;

use crate::backend::{BackendCapabilities, FetchBackend, FetchConfig, FetchRequest, FetchResponse};

/// Renders pages in a headless Chromium instance before returning their
/// post-JavaScript HTML. One browser process is shared across fetches;
/// navigation happens sequentially through an internal mutex since the
/// underlying `Browser` handle is not meant for concurrent page creation
/// without coordination.
pub struct HeadlessBackend {
    browser: Mutex<Browser>,
    _handler: tokio::task::JoinHandle<()>,
}

impl HeadlessBackend {
    pub async fn launch() -> mirrordocs_shared::Result<Self> {
        let config = BrowserConfig::builder()
            .build()
            .map_err(|e| mirrordocs_shared::CrawlError::backend_init("headless", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| mirrordocs_shared::CrawlError::backend_init("headless", e.to_string()))?;

        let handler_task = tokio::task::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!(error = %e, "headless browser handler event error");
                }
            }
        });

        Ok(Self {
            browser: Mutex::new(browser),
            _handler: handler_task,
        })
    }
}

#[async_trait]
impl FetchBackend for HeadlessBackend {
    async fn fetch(&self, request: &FetchRequest, config: &FetchConfig) -> FetchResponse {
        let started = Instant::now();
        let url = request.url.clone();

        let browser = self.browser.lock().await;
        let page = match browser.new_page(request.url.raw()).await {
            Ok(page) => page,
            Err(e) => return FetchResponse::transport_error(url, e.to_string(), started.elapsed()),
        };

        let wait = page.wait_for_navigation();
        if let Err(e) = tokio::time::timeout(config.timeout, wait).await {
            return FetchResponse::transport_error(url, format!("navigation timed out: {e}"), started.elapsed());
        }

        let html = match page.content().await {
            Ok(html) => html,
            Err(e) => return FetchResponse::transport_error(url, e.to_string(), started.elapsed()),
        };

        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .map(|u| mirrordocs_url::URLInfo::parse(&u, None))
            .unwrap_or(url);

        let _ = page.close().await;

        FetchResponse {
            status: 200,
            final_url,
            headers: Default::default(),
            body: html.into_bytes(),
            content_type: Some("text/html".to_string()),
            error_reason: None,
            duration: started.elapsed(),
        }
    }

    fn name(&self) -> &str {
        "headless"
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            html: true,
            renders_js: true,
        }
    }

    async fn close(&self) -> Result<(), String> {
        let mut browser = self.browser.lock().await;
        browser.close().await.map_err(|e| e.to_string())?;
        browser.wait().await.map_err(|e| e.to_string())?;
        Ok(())
    }
}
