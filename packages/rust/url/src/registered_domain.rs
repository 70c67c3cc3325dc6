//! Public-suffix-aware registered-domain parsing.
//!
//! No crate in the retrieval pack already depends on a public-suffix-list
//! implementation (classification by registered domain is not something
//! any example crawler does), so this pulls in the `psl` crate — a small,
//! no-IO, embedded-list implementation — as a deliberate addition. See
//! `DESIGN.md` for the justification.

use psl::Psl;

/// Root domain + public suffix + optional subdomain, e.g. `sub.example.co.uk`
/// → `{ subdomain: Some("sub"), root_domain: "example", suffix: "co.uk" }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredDomain {
    pub subdomain: Option<String>,
    pub root_domain: String,
    pub suffix: String,
}

impl RegisteredDomain {
    /// The registrable domain (root + suffix), e.g. `example.co.uk`.
    pub fn registrable(&self) -> String {
        format!("{}.{}", self.root_domain, self.suffix)
    }
}

/// Parse a host into a [`RegisteredDomain`]. Returns `None` for IP
/// literals, bare `localhost`-style hosts, or anything the public suffix
/// list has no opinion on — callers fall back to bare-host comparison in
/// that case (see `classify`).
pub(crate) fn parse(host: &str) -> Option<RegisteredDomain> {
    if host.parse::<std::net::IpAddr>().is_ok() {
        return None;
    }

    let list = psl::List;
    let domain = list.domain(host.as_bytes())?;
    let suffix = domain.suffix();
    let suffix_str = std::str::from_utf8(suffix.as_bytes()).ok()?.to_string();

    let full = std::str::from_utf8(domain.as_bytes()).ok()?;
    let root_domain = full
        .strip_suffix(&format!(".{suffix_str}"))
        .unwrap_or(full)
        .to_string();

    if root_domain.is_empty() {
        return None;
    }

    let subdomain = host
        .strip_suffix(full)
        .map(|s| s.trim_end_matches('.'))
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    Some(RegisteredDomain {
        subdomain,
        root_domain,
        suffix: suffix_str,
    })
}
