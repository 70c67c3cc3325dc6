//! End-to-end crawl scenarios driven through the full `Crawler::crawl`
//! pipeline against a scripted backend instead of a real network — mirrors
//! the teacher's `test_crawl_with_mock_server` style (`crawler/src/engine.rs`)
//! but swaps `wiremock` for a canned in-process backend, since `Crawler`
//! validates seeds against the private/loopback guard (§4.1) before a
//! `wiremock` loopback server could ever be reached.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mirrordocs_backend::{BackendCapabilities, BackendCriteria, FetchBackend, FetchConfig, FetchRequest, FetchResponse};
use mirrordocs_crawler::{Crawler, CrawlerContextBuilder, CrawlTarget};
use mirrordocs_shared::CrawlerConfig;
use mirrordocs_url::URLInfo;

/// A [`FetchBackend`] that serves pre-scripted responses keyed by
/// normalized request URL, and counts fetches per URL.
struct ScriptedBackend {
    responses: HashMap<String, FetchResponse>,
    fetch_counts: Mutex<HashMap<String, u32>>,
}

impl ScriptedBackend {
    fn new(responses: HashMap<String, FetchResponse>) -> Self {
        Self {
            responses,
            fetch_counts: Mutex::new(HashMap::new()),
        }
    }

    fn fetch_count(&self, url: &str) -> u32 {
        self.fetch_counts.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl FetchBackend for ScriptedBackend {
    async fn fetch(&self, request: &FetchRequest, _config: &FetchConfig) -> FetchResponse {
        let key = request.url.normalized_url().to_string();
        *self.fetch_counts.lock().unwrap().entry(key.clone()).or_insert(0) += 1;
        match self.responses.get(&key) {
            Some(response) => response.clone(),
            None => FetchResponse::transport_error(request.url.clone(), "scripted_miss: no canned response", Duration::ZERO),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities { html: true, renders_js: false }
    }
}

fn html(url: &URLInfo, body: &str) -> FetchResponse {
    FetchResponse {
        status: 200,
        final_url: url.clone(),
        headers: HashMap::new(),
        body: body.as_bytes().to_vec(),
        content_type: Some("text/html".to_string()),
        error_reason: None,
        duration: Duration::ZERO,
    }
}

fn redirect(target_url: &URLInfo) -> FetchResponse {
    FetchResponse {
        status: 301,
        final_url: target_url.clone(),
        headers: HashMap::new(),
        body: Vec::new(),
        content_type: None,
        error_reason: None,
        duration: Duration::ZERO,
    }
}

fn test_config() -> CrawlerConfig {
    CrawlerConfig {
        concurrent_requests: 4,
        processing_concurrency: 4,
        max_retries: 0,
        retry_base_delay: Duration::from_millis(1),
        requests_per_second: 0.0,
        burst: 1,
        request_timeout: Duration::from_secs(5),
        crawl_timeout: Duration::from_secs(5),
        user_agent: "mirrordocs-test".to_string(),
        max_redirects: 5,
    }
}

fn crawler_with(backend: ScriptedBackend) -> Crawler {
    let context = CrawlerContextBuilder::new(test_config())
        .register_backend("scripted", Arc::new(backend), BackendCriteria::wildcard(0))
        .build();
    Crawler::new(context)
}

fn target(seed: &str, max_depth: u32, max_pages: usize) -> CrawlTarget {
    let mut t = CrawlTarget::new(seed);
    t.max_depth = max_depth;
    t.max_pages = max_pages;
    t
}

#[tokio::test]
async fn single_page_with_no_links() {
    let seed = URLInfo::parse("https://docs.example.com/a", None);
    let mut responses = HashMap::new();
    responses.insert(seed.normalized_url().to_string(), html(&seed, "<html><body>hi</body></html>"));

    let crawler = crawler_with(ScriptedBackend::new(responses));
    let result = crawler.crawl(target("https://docs.example.com/a", 3, 50)).await;

    assert_eq!(result.stats.pages_crawled, 1);
    assert_eq!(result.stats.successful_crawls, 1);
    assert_eq!(result.pages.len(), 1);
    assert_eq!(result.visited_count, 1);
}

#[tokio::test]
async fn depth_limited_crawl_stops_past_max_depth() {
    let seed = URLInfo::parse("https://docs.example.com/", None);
    let a = URLInfo::parse("https://docs.example.com/a", None);
    let b = URLInfo::parse("https://docs.example.com/b", None);
    let c = URLInfo::parse("https://docs.example.com/c", None);

    let mut responses = HashMap::new();
    responses.insert(seed.normalized_url().to_string(), html(&seed, r#"<a href="/a">a</a><a href="/b">b</a>"#));
    responses.insert(a.normalized_url().to_string(), html(&a, r#"<a href="/c">c</a>"#));
    responses.insert(b.normalized_url().to_string(), html(&b, ""));
    responses.insert(c.normalized_url().to_string(), html(&c, ""));

    let crawler = crawler_with(ScriptedBackend::new(responses));
    let result = crawler.crawl(target("https://docs.example.com/", 1, 50)).await;

    assert_eq!(result.stats.pages_crawled, 3, "seed, a, b — not c");
    assert!(result.pages.iter().all(|p| p.source_url.normalized_url() != c.normalized_url()));
}

#[tokio::test]
async fn duplicate_links_are_fetched_exactly_once() {
    let seed = URLInfo::parse("https://docs.example.com/", None);
    let dup = URLInfo::parse("https://docs.example.com/dup", None);

    let mut responses = HashMap::new();
    responses.insert(
        seed.normalized_url().to_string(),
        html(&seed, r#"<a href="/dup">x</a><a href="/dup">y</a>"#),
    );
    responses.insert(dup.normalized_url().to_string(), html(&dup, ""));

    let backend = Arc::new(ScriptedBackend::new(responses));
    let context = CrawlerContextBuilder::new(test_config())
        .register_backend("scripted", backend.clone(), BackendCriteria::wildcard(0))
        .build();
    let crawler = Crawler::new(context);

    let mut t = target("https://docs.example.com/", 3, 50);
    t.concurrency_override = Some(4);
    let result = crawler.crawl(t).await;

    assert_eq!(result.stats.successful_crawls, 2, "seed + dup, nothing double-counted");
    assert_eq!(result.visited_count, 2);
    assert_eq!(backend.fetch_count(dup.normalized_url()), 1);
}

#[tokio::test]
async fn redirect_to_an_already_visited_url_is_not_refetched() {
    let seed = URLInfo::parse("https://docs.example.com/", None);
    let a = URLInfo::parse("https://docs.example.com/a", None);
    let b = URLInfo::parse("https://docs.example.com/b", None);

    let mut responses = HashMap::new();
    responses.insert(seed.normalized_url().to_string(), html(&seed, r#"<a href="/a">a</a><a href="/b">b</a>"#));
    responses.insert(a.normalized_url().to_string(), html(&a, ""));
    responses.insert(b.normalized_url().to_string(), redirect(&a));

    let crawler = crawler_with(ScriptedBackend::new(responses));
    let result = crawler.crawl(target("https://docs.example.com/", 3, 50)).await;

    assert!(result.pages.iter().any(|p| p.source_url.normalized_url() == a.normalized_url()));
    assert!(result.pages.iter().all(|p| p.source_url.normalized_url() != b.normalized_url()));
    assert!(
        result
            .issues
            .iter()
            .any(|i| i.kind == "redirected_to_visited" && i.url == b.normalized_url())
    );
}

#[tokio::test]
async fn external_links_are_not_followed_by_default() {
    let seed = URLInfo::parse("https://docs.a.com/", None);
    let page = URLInfo::parse("https://docs.a.com/page", None);
    let external = URLInfo::parse("https://other.com/", None);

    let mut responses = HashMap::new();
    responses.insert(
        seed.normalized_url().to_string(),
        html(&seed, r#"<a href="/page">page</a><a href="https://other.com/">ext</a>"#),
    );
    responses.insert(page.normalized_url().to_string(), html(&page, ""));
    responses.insert(external.normalized_url().to_string(), html(&external, ""));

    let crawler = crawler_with(ScriptedBackend::new(responses));
    let result = crawler.crawl(target("https://docs.a.com/", 3, 50)).await;

    assert_eq!(result.visited_count, 2, "seed + /page only");
    assert!(!result.per_host_requests.contains_key("other.com"));
}

#[tokio::test]
async fn exclude_pattern_blocks_matching_paths() {
    let seed = URLInfo::parse("https://docs.example.com/", None);
    let api = URLInfo::parse("https://docs.example.com/api/v1/x", None);
    let blog = URLInfo::parse("https://docs.example.com/blog/y", None);

    let mut responses = HashMap::new();
    responses.insert(
        seed.normalized_url().to_string(),
        html(&seed, r#"<a href="/api/v1/x">api</a><a href="/blog/y">blog</a>"#),
    );
    responses.insert(api.normalized_url().to_string(), html(&api, ""));
    responses.insert(blog.normalized_url().to_string(), html(&blog, ""));

    let backend = ScriptedBackend::new(responses);
    let context = CrawlerContextBuilder::new(test_config())
        .register_backend("scripted", Arc::new(backend), BackendCriteria::wildcard(0))
        .build();
    let crawler = Crawler::new(context);

    let mut t = target("https://docs.example.com/", 3, 50);
    t.exclude_patterns = vec!["/blog/".to_string()];
    let result = crawler.crawl(t).await;

    assert_eq!(result.visited_count, 2, "seed + /api/v1/x only");
    assert!(result.pages.iter().all(|p| p.source_url.normalized_url() != blog.normalized_url()));
}

#[tokio::test]
async fn max_depth_zero_fetches_only_the_seed() {
    let seed = URLInfo::parse("https://docs.example.com/", None);
    let a = URLInfo::parse("https://docs.example.com/a", None);

    let mut responses = HashMap::new();
    responses.insert(seed.normalized_url().to_string(), html(&seed, r#"<a href="/a">a</a>"#));
    responses.insert(a.normalized_url().to_string(), html(&a, ""));

    let crawler = crawler_with(ScriptedBackend::new(responses));
    let result = crawler.crawl(target("https://docs.example.com/", 0, 50)).await;

    assert_eq!(result.stats.pages_crawled, 1);
    assert_eq!(result.visited_count, 1);
}

#[tokio::test]
async fn max_pages_one_fetches_exactly_one_page() {
    let seed = URLInfo::parse("https://docs.example.com/", None);
    let a = URLInfo::parse("https://docs.example.com/a", None);
    let b = URLInfo::parse("https://docs.example.com/b", None);

    let mut responses = HashMap::new();
    responses.insert(seed.normalized_url().to_string(), html(&seed, r#"<a href="/a">a</a><a href="/b">b</a>"#));
    responses.insert(a.normalized_url().to_string(), html(&a, ""));
    responses.insert(b.normalized_url().to_string(), html(&b, ""));

    let crawler = crawler_with(ScriptedBackend::new(responses));
    let result = crawler.crawl(target("https://docs.example.com/", 3, 1)).await;

    assert_eq!(result.stats.pages_crawled, 1);
    assert_eq!(result.visited_count, 1);
}
