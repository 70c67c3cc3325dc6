//! Post-processing quality scoring for a [`ProcessedPage`].
//!
//! No direct teacher precedent — the teacher's crawler has no quality-check
//! stage — so this is a fresh, intentionally small design: the C7 contract
//! only requires *some* working `QualityChecker` collaborator, not a rich
//! scoring product.

use async_trait::async_trait;
use mirrordocs_content::ProcessedPage;

const MIN_CONTENT_LENGTH: usize = 200;
const MIN_LINK_COUNT_FOR_HUB_WARNING: usize = 200;

/// One non-fatal observation about a processed page's quality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityIssue {
    pub kind: QualityIssueKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityIssueKind {
    MissingTitle,
    ThinContent,
    NoLinks,
    LinkHeavy,
}

/// Simple scalar metrics computed alongside the issue list.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QualityMetrics {
    pub text_length: usize,
    pub link_count: usize,
    pub has_title: bool,
}

/// Scores a [`ProcessedPage`], producing issues and metrics. Issues are
/// always non-fatal — they annotate the page, they never abort the crawl.
#[async_trait]
pub trait QualityChecker: Send + Sync {
    async fn check(&self, page: &ProcessedPage) -> (Vec<QualityIssue>, QualityMetrics);
}

/// The crate's only built-in checker: length/title/link-count heuristics.
#[derive(Debug, Default)]
pub struct HeuristicQualityChecker;

#[async_trait]
impl QualityChecker for HeuristicQualityChecker {
    async fn check(&self, page: &ProcessedPage) -> (Vec<QualityIssue>, QualityMetrics) {
        let text_length = text_length(&page.structure);
        let link_count = page.raw_links.len();
        let has_title = page.title.as_deref().is_some_and(|t| !t.trim().is_empty());

        let mut issues = Vec::new();

        if !has_title {
            issues.push(QualityIssue {
                kind: QualityIssueKind::MissingTitle,
                message: "page has no non-empty title".to_string(),
            });
        }

        if text_length < MIN_CONTENT_LENGTH {
            issues.push(QualityIssue {
                kind: QualityIssueKind::ThinContent,
                message: format!("extracted text is only {text_length} characters"),
            });
        }

        if link_count == 0 {
            issues.push(QualityIssue {
                kind: QualityIssueKind::NoLinks,
                message: "page has no outgoing links".to_string(),
            });
        } else if link_count >= MIN_LINK_COUNT_FOR_HUB_WARNING {
            issues.push(QualityIssue {
                kind: QualityIssueKind::LinkHeavy,
                message: format!("page has {link_count} links, likely an index/hub page"),
            });
        }

        (
            issues,
            QualityMetrics {
                text_length,
                link_count,
                has_title,
            },
        )
    }
}

fn text_length(node: &mirrordocs_content::Node) -> usize {
    match node {
        mirrordocs_content::Node::Text { value } => value.len(),
        mirrordocs_content::Node::Link { .. } => 0,
        _ => node.children().iter().map(text_length).sum(),
    }
}
