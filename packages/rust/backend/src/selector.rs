//! Backend selector (C4). Selection is pure: it never retries or fetches.

use std::sync::Arc;

use mirrordocs_url::URLInfo;

use crate::backend::FetchBackend;
use crate::registry::BackendRegistry;

/// Stateless scorer/picker over a [`BackendRegistry`] (§4.4).
#[derive(Default)]
pub struct BackendSelector;

impl BackendSelector {
    pub fn new() -> Self {
        Self
    }

    /// Score every registered backend against `url`/`content_type` and
    /// return the highest scorer, ties broken by registration order.
    pub fn select(
        &self,
        registry: &BackendRegistry,
        url: &URLInfo,
        content_type: Option<&str>,
    ) -> Option<Arc<dyn FetchBackend>> {
        let host = url.host().unwrap_or_default();
        let normalized_ct = content_type.map(normalize_content_type);

        let mut best: Option<(i32, Arc<dyn FetchBackend>)> = None;
        let mut best_wildcard: Option<(i32, Arc<dyn FetchBackend>)> = None;

        for (_, backend, criteria) in registry.list() {
            if criteria.is_wildcard_pattern() {
                let candidate = (criteria.priority, backend.clone());
                if best_wildcard.as_ref().is_none_or(|(p, _)| candidate.0 > *p) {
                    best_wildcard = Some(candidate);
                }
            }

            let Some(url_score) = criteria.url_score(host) else {
                continue;
            };

            let content_score = criteria.content_type_score(normalized_ct.as_deref());

            let html_bonus = if content_type.is_none() && criteria.capabilities.html {
                10
            } else {
                0
            };

            let total = url_score + content_score + criteria.priority + html_bonus;

            if best.as_ref().is_none_or(|(score, _)| total > *score) {
                best = Some((total, backend.clone()));
            }
        }

        match best {
            Some((score, backend)) if score > 0 => Some(backend),
            _ => best_wildcard.map(|(_, backend)| backend),
        }
    }
}

fn normalize_content_type(ct: &str) -> String {
    ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendCapabilities, FetchConfig, FetchRequest, FetchResponse};
    use crate::criteria::BackendCriteria;
    use async_trait::async_trait;
    use std::time::Duration;

    struct Tagged(&'static str);

    #[async_trait]
    impl FetchBackend for Tagged {
        async fn fetch(&self, request: &FetchRequest, _config: &FetchConfig) -> FetchResponse {
            FetchResponse::transport_error(request.url.clone(), "unused", Duration::ZERO)
        }
        fn name(&self) -> &str {
            self.0
        }
    }

    fn seed_url() -> URLInfo {
        URLInfo::parse("https://docs.example.com/guide", None)
    }

    #[test]
    fn exact_host_beats_wildcard() {
        let mut registry = BackendRegistry::new();
        registry.register("wild", Arc::new(Tagged("wild")), BackendCriteria::wildcard(0));
        registry.register(
            "exact",
            Arc::new(Tagged("exact")),
            BackendCriteria::for_host("docs.example.com", 0),
        );

        let picked = BackendSelector::new()
            .select(&registry, &seed_url(), None)
            .expect("a backend must be picked");
        assert_eq!(picked.name(), "exact");
    }

    #[test]
    fn exact_host_beats_suffix_match() {
        let mut registry = BackendRegistry::new();
        registry.register(
            "suffix",
            Arc::new(Tagged("suffix")),
            BackendCriteria::for_host_suffix("example.com", 0),
        );
        registry.register(
            "exact",
            Arc::new(Tagged("exact")),
            BackendCriteria::for_host("docs.example.com", 0),
        );

        let picked = BackendSelector::new()
            .select(&registry, &seed_url(), None)
            .expect("a backend must be picked");
        assert_eq!(picked.name(), "exact");
    }

    #[test]
    fn suffix_match_disqualifies_unrelated_hosts() {
        let mut registry = BackendRegistry::new();
        registry.register(
            "suffix",
            Arc::new(Tagged("suffix")),
            BackendCriteria::for_host_suffix("other.com", 50),
        );
        registry.register("wild", Arc::new(Tagged("wild")), BackendCriteria::wildcard(0));

        let picked = BackendSelector::new()
            .select(&registry, &seed_url(), None)
            .expect("falls back to wildcard");
        assert_eq!(picked.name(), "wild");
    }

    #[test]
    fn disqualified_non_wildcard_backend_is_skipped() {
        let mut registry = BackendRegistry::new();
        registry.register(
            "other-host",
            Arc::new(Tagged("other-host")),
            BackendCriteria::for_host("other.com", 50),
        );
        registry.register("wild", Arc::new(Tagged("wild")), BackendCriteria::wildcard(0));

        let picked = BackendSelector::new()
            .select(&registry, &seed_url(), None)
            .expect("falls back to wildcard");
        assert_eq!(picked.name(), "wild");
    }

    #[test]
    fn html_preference_breaks_ties_when_content_type_unspecified() {
        let mut registry = BackendRegistry::new();
        registry.register(
            "plain",
            Arc::new(Tagged("plain")),
            BackendCriteria::wildcard(0),
        );
        registry.register(
            "html",
            Arc::new(Tagged("html")),
            BackendCriteria::wildcard(0).with_capabilities(BackendCapabilities {
                html: true,
                renders_js: false,
            }),
        );

        let picked = BackendSelector::new()
            .select(&registry, &seed_url(), None)
            .expect("a backend must be picked");
        assert_eq!(picked.name(), "html");
    }

    #[test]
    fn exact_content_type_beats_wildcard_family() {
        let mut registry = BackendRegistry::new();
        registry.register(
            "family",
            Arc::new(Tagged("family")),
            BackendCriteria::wildcard(0).with_content_type("text/*"),
        );
        registry.register(
            "exact-ct",
            Arc::new(Tagged("exact-ct")),
            BackendCriteria::wildcard(0).with_content_type("text/html"),
        );

        let picked = BackendSelector::new()
            .select(&registry, &seed_url(), Some("text/html; charset=utf-8"))
            .expect("a backend must be picked");
        assert_eq!(picked.name(), "exact-ct");
    }

    #[test]
    fn empty_registry_selects_nothing() {
        let registry = BackendRegistry::new();
        assert!(BackendSelector::new().select(&registry, &seed_url(), None).is_none());
    }
}
