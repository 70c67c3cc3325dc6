//! FIFO frontier + visited set (C6), single-owner per §5: only the
//! orchestrator ever calls [`Frontier::enqueue`]/[`Frontier::dequeue`].

use std::collections::{HashSet, VecDeque};

use mirrordocs_url::{Classification, URLInfo};

use crate::types::CrawlTarget;

#[derive(Debug, Clone)]
pub struct FrontierEntry {
    pub url: URLInfo,
    pub depth: u32,
}

/// FIFO queue of pending URLs plus the set of normalized URLs already
/// enqueued or completed. Membership is decided at enqueue time, not
/// completion time, so in-flight duplicates are suppressed.
#[derive(Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt to enqueue `url` at `depth`, relative to `base` for
    /// internal/external classification. Returns `true` if it was
    /// enqueued. Checks the six no-op conditions in order and
    /// short-circuits on the first that applies.
    pub fn enqueue(&mut self, url: &URLInfo, depth: u32, base: &URLInfo, target: &CrawlTarget) -> bool {
        if !url.is_valid() {
            return false;
        }
        if self.visited.contains(url.normalized_url()) {
            return false;
        }
        if depth > target.max_depth {
            return false;
        }
        if self.visited.len() >= target.max_pages {
            return false;
        }
        if !passes_filters(url, target) {
            return false;
        }
        if self.is_external(url, base, target) && !target.follow_external {
            return false;
        }

        self.visited.insert(url.normalized_url().to_string());
        self.queue.push_back(FrontierEntry { url: url.clone(), depth });
        true
    }

    pub fn dequeue(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Mark `url` as visited without enqueuing it — used when a redirect's
    /// final URL needs to claim visited-set membership directly (§4.7).
    pub fn mark_visited(&mut self, url: &URLInfo) {
        self.visited.insert(url.normalized_url().to_string());
    }

    pub fn is_visited(&self, url: &URLInfo) -> bool {
        self.visited.contains(url.normalized_url())
    }

    fn is_external(&self, url: &URLInfo, base: &URLInfo, target: &CrawlTarget) -> bool {
        match url.classify(base) {
            Classification::Internal => false,
            Classification::InternalSubdomain => !target.follow_external_subdomains,
            Classification::External | Classification::Unknown => true,
        }
    }
}

fn passes_filters(url: &URLInfo, target: &CrawlTarget) -> bool {
    let path = url.path();

    if target.excluded_path_prefixes.iter().any(|p| path.starts_with(p.as_str())) {
        return false;
    }
    if !target.allowed_path_prefixes.is_empty() && !target.allowed_path_prefixes.iter().any(|p| path.starts_with(p.as_str())) {
        return false;
    }
    if target.exclude_patterns.iter().any(|p| path.contains(p.as_str())) {
        return false;
    }
    if !target.include_patterns.is_empty() && !target.include_patterns.iter().any(|p| path.contains(p.as_str())) {
        return false;
    }

    true
}
