//! Library-name → documentation-URL discovery (C8's seed-resolution
//! collaborator).
//!
//! No teacher precedent for project identification specifically — the
//! teacher's own `discovery` crate does llms.txt detection at an already-known
//! URL, a different problem. `query::build_queries` is the one piece the
//! written spec pins down exactly; the rest (`identify`/
//! `search_for_project_docs`) is a fresh, deliberately minimal default
//! implementation, since a richer discovery product is explicitly not a
//! goal here.

pub mod query;

use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

pub use query::build_queries;

/// What kind of thing was identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    Library,
    Framework,
    Unknown,
}

/// Best-effort identification of a project from a URL or a bare name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectIdentity {
    pub name: String,
    pub kind: ProjectKind,
    pub version: Option<String>,
}

/// Resolves library/project names to candidate documentation URLs.
#[async_trait]
pub trait ProjectDiscovery: Send + Sync {
    /// Best-effort project identification from a URL already being visited.
    async fn identify(&self, url: &mirrordocs_url::URLInfo) -> Option<ProjectIdentity>;

    /// Resolve search queries (from [`build_queries`]) to candidate
    /// documentation root URLs.
    async fn search_for_project_docs(&self, queries: &[String]) -> Vec<mirrordocs_url::URLInfo>;
}

static DOCS_RS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/([A-Za-z0-9_\-]+)(?:/([0-9][\w.\-]*))?").unwrap());
static PYPI: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/project/([A-Za-z0-9_\-.]+)").unwrap());
static NPM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/package/([@A-Za-z0-9_\-./]+)").unwrap());

/// Recognizes a handful of well-known documentation hosts by URL shape, and
/// for search-query resolution, guesses candidate roots on those same hosts
/// rather than calling out to a real web-search API (none of the example
/// pack's search integrations is reusable standalone — they are bundled
/// with a full headless-browser stealth stack this crate doesn't carry).
#[derive(Debug, Default)]
pub struct HeuristicProjectDiscovery;

#[async_trait]
impl ProjectDiscovery for HeuristicProjectDiscovery {
    async fn identify(&self, url: &mirrordocs_url::URLInfo) -> Option<ProjectIdentity> {
        let host = url.host()?;
        let path = url.path();

        if host == "docs.rs" {
            let caps = DOCS_RS.captures(path)?;
            return Some(ProjectIdentity {
                name: caps.get(1)?.as_str().to_string(),
                kind: ProjectKind::Library,
                version: caps.get(2).map(|m| m.as_str().to_string()),
            });
        }

        if host == "pypi.org" {
            let caps = PYPI.captures(path)?;
            return Some(ProjectIdentity {
                name: caps.get(1)?.as_str().to_string(),
                kind: ProjectKind::Library,
                version: None,
            });
        }

        if host == "www.npmjs.com" || host == "npmjs.com" {
            let caps = NPM.captures(path)?;
            return Some(ProjectIdentity {
                name: caps.get(1)?.as_str().to_string(),
                kind: ProjectKind::Library,
                version: None,
            });
        }

        if let Some(name) = host.strip_suffix(".readthedocs.io") {
            return Some(ProjectIdentity {
                name: name.to_string(),
                kind: ProjectKind::Library,
                version: None,
            });
        }

        None
    }

    async fn search_for_project_docs(&self, queries: &[String]) -> Vec<mirrordocs_url::URLInfo> {
        let mut candidates = Vec::new();
        for query in queries {
            let Some(name) = query_subject(query) else { continue };
            for candidate in [
                format!("https://docs.rs/{name}"),
                format!("https://{name}.readthedocs.io"),
                format!("https://pypi.org/project/{name}/"),
            ] {
                let url = mirrordocs_url::URLInfo::parse(&candidate, None);
                if url.is_valid() {
                    candidates.push(url);
                }
            }
        }
        candidates
    }
}

/// Pull the leading `{name}` token off a generated query like
/// `"{name} documentation"` or `"{name} api reference"`.
fn query_subject(query: &str) -> Option<String> {
    for suffix in [" documentation", " api reference", " tutorial", " guide"] {
        if let Some(name) = query.strip_suffix(suffix) {
            return Some(name.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identifies_docs_rs_crate_with_version() {
        let url = mirrordocs_url::URLInfo::parse("https://docs.rs/tokio/1.35.0/tokio/", None);
        let identity = HeuristicProjectDiscovery.identify(&url).await.unwrap();
        assert_eq!(identity.name, "tokio");
        assert_eq!(identity.version.as_deref(), Some("1.35.0"));
    }

    #[tokio::test]
    async fn identifies_readthedocs_subdomain() {
        let url = mirrordocs_url::URLInfo::parse("https://requests.readthedocs.io/en/latest/", None);
        let identity = HeuristicProjectDiscovery.identify(&url).await.unwrap();
        assert_eq!(identity.name, "requests");
    }

    #[tokio::test]
    async fn unrecognized_host_yields_none() {
        let url = mirrordocs_url::URLInfo::parse("https://example.com/whatever", None);
        assert!(HeuristicProjectDiscovery.identify(&url).await.is_none());
    }

    #[tokio::test]
    async fn search_for_project_docs_builds_known_host_candidates() {
        let queries = vec!["tokio documentation".to_string()];
        let candidates = HeuristicProjectDiscovery.search_for_project_docs(&queries).await;
        assert!(candidates.iter().any(|c| c.host() == Some("docs.rs")));
        assert!(candidates.iter().any(|c| c.host() == Some("tokio.readthedocs.io")));
    }
}
