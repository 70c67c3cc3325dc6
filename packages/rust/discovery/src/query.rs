//! Search-query generation for [`crate::ProjectIdentity`] (§4.8).

use crate::{ProjectIdentity, ProjectKind};

/// Build the queries a caller should hand to a web search in order to find
/// a project's documentation root, per the exact three-branch algorithm:
/// versioned libraries get version-scoped queries (full then major.minor),
/// unversioned libraries get a fixed four-query spread, and an unparseable
/// version falls back to the single generic query rather than raising.
pub fn build_queries(identity: &ProjectIdentity) -> Vec<String> {
    if !matches!(identity.kind, ProjectKind::Library | ProjectKind::Framework) {
        return vec![format!("{} documentation", identity.name)];
    }

    match identity.version.as_deref().map(parse_semver) {
        Some(Some((major, minor, patch))) => vec![
            format!("{} {major}.{minor}.{patch} documentation", identity.name),
            format!("{} {major}.{minor} documentation", identity.name),
            format!("{} documentation", identity.name),
        ],
        Some(None) => vec![format!("{} documentation", identity.name)],
        None => vec![
            format!("{} documentation", identity.name),
            format!("{} api reference", identity.name),
            format!("{} tutorial", identity.name),
            format!("{} guide", identity.name),
        ],
    }
}

/// Parse a `major.minor.patch`-shaped version string. Anything else (a
/// range, a git ref, a pre-release suffix with non-numeric components) is
/// treated as unparseable rather than raising.
fn parse_semver(version: &str) -> Option<(u64, u64, u64)> {
    let core = version.split(['-', '+']).next().unwrap_or(version);
    let mut parts = core.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((major, minor, patch))
}
