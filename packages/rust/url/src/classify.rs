//! Classification of one URL relative to a base (§4.1).

use crate::URLInfo;

/// Where a URL sits relative to a base URL's registered domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Same registered domain, same subdomain.
    Internal,
    /// Same registered domain, different subdomain.
    InternalSubdomain,
    /// Different registered domain.
    External,
    /// Neither side has a host to compare at all.
    Unknown,
}

pub(crate) fn classify(url: &URLInfo, base: &URLInfo) -> Classification {
    match (url.registered_domain(), base.registered_domain()) {
        (Some(a), Some(b)) => {
            if a.registrable() != b.registrable() {
                Classification::External
            } else if a.subdomain == b.subdomain {
                Classification::Internal
            } else {
                Classification::InternalSubdomain
            }
        }
        // IP literals and bare hosts like `localhost` have no registered
        // domain to compare — fall back to comparing the host string itself.
        _ => match (url.host(), base.host()) {
            (Some(a), Some(b)) if a.eq_ignore_ascii_case(b) => Classification::Internal,
            (Some(_), Some(_)) => Classification::External,
            _ => Classification::Unknown,
        },
    }
}
