//! Per-backend registration record (§4.3's `BackendCriteria`).

use crate::backend::BackendCapabilities;

/// URL-pattern matcher for a registered backend.
#[derive(Debug, Clone)]
pub enum UrlPattern {
    /// Matches only an exact host.
    ExactHost(String),
    /// Matches a host suffix, e.g. `*.example.com`.
    Suffix(String),
    /// Matches anything (the fallback pattern).
    Wildcard,
}

impl UrlPattern {
    fn matches(&self, host: &str) -> bool {
        match self {
            UrlPattern::ExactHost(h) => host.eq_ignore_ascii_case(h),
            UrlPattern::Suffix(suffix) => {
                host.eq_ignore_ascii_case(suffix) || host.to_ascii_lowercase().ends_with(&format!(".{}", suffix.to_ascii_lowercase()))
            }
            UrlPattern::Wildcard => true,
        }
    }

    fn is_wildcard(&self) -> bool {
        matches!(self, UrlPattern::Wildcard)
    }
}

/// Content-type matcher for a registered backend.
#[derive(Debug, Clone)]
pub enum ContentTypePattern {
    Exact(String),
    /// A wildcard family, e.g. `text/*`.
    WildcardFamily(String),
}

#[derive(Debug, Clone)]
pub struct BackendCriteria {
    pub url_pattern: UrlPattern,
    pub content_types: Vec<ContentTypePattern>,
    pub priority: i32,
    pub capabilities: BackendCapabilities,
}

impl BackendCriteria {
    pub fn wildcard(priority: i32) -> Self {
        Self {
            url_pattern: UrlPattern::Wildcard,
            content_types: Vec::new(),
            priority,
            capabilities: BackendCapabilities::default(),
        }
    }

    /// Matches a host suffix, e.g. `for_host_suffix("example.com", ..)`
    /// also matches `docs.example.com` and `api.example.com`.
    pub fn for_host_suffix(suffix: impl Into<String>, priority: i32) -> Self {
        Self {
            url_pattern: UrlPattern::Suffix(suffix.into()),
            content_types: Vec::new(),
            priority,
            capabilities: BackendCapabilities::default(),
        }
    }

    pub fn for_host(host: impl Into<String>, priority: i32) -> Self {
        Self {
            url_pattern: UrlPattern::ExactHost(host.into()),
            content_types: Vec::new(),
            priority,
            capabilities: BackendCapabilities::default(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        let s: String = content_type.into();
        if let Some(family) = s.strip_suffix("/*") {
            self.content_types
                .push(ContentTypePattern::WildcardFamily(family.to_string()));
        } else {
            self.content_types.push(ContentTypePattern::Exact(s));
        }
        self
    }

    pub fn with_capabilities(mut self, capabilities: BackendCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub(crate) fn url_matches(&self, host: &str) -> bool {
        self.url_pattern.matches(host)
    }

    pub(crate) fn is_wildcard_pattern(&self) -> bool {
        self.url_pattern.is_wildcard()
    }

    /// Score this criteria's URL-pattern component for `host`. `None` means
    /// disqualified (no match and not a wildcard pattern).
    pub(crate) fn url_score(&self, host: &str) -> Option<i32> {
        match &self.url_pattern {
            UrlPattern::ExactHost(h) if h.eq_ignore_ascii_case(host) => Some(100),
            UrlPattern::Suffix(suffix) if self.url_matches(host) => {
                let _ = suffix;
                Some(60)
            }
            UrlPattern::Wildcard => Some(0),
            _ => None,
        }
    }

    /// Score this criteria's content-type component. `content_type` is
    /// already parsed with parameters stripped, lowercase.
    pub(crate) fn content_type_score(&self, content_type: Option<&str>) -> i32 {
        let Some(ct) = content_type else { return 0 };
        for pattern in &self.content_types {
            match pattern {
                ContentTypePattern::Exact(exact) if exact.eq_ignore_ascii_case(ct) => return 40,
                ContentTypePattern::WildcardFamily(family) => {
                    if let Some((ct_family, _)) = ct.split_once('/') {
                        if ct_family.eq_ignore_ascii_case(family) {
                            return 20;
                        }
                    }
                }
                _ => {}
            }
        }
        0
    }
}
