//! Turns fetched HTML bytes into a normalized, typed content tree.
//!
//! [`ContentProcessor`] is the pipeline's collaborator interface (C7 calls
//! it once per successfully fetched page); [`HtmlContentProcessor`] is the
//! crate's only built-in implementation — a richer, platform-aware
//! processor is explicitly out of scope.

pub mod generic;
pub mod node;

use async_trait::async_trait;

pub use generic::HtmlContentProcessor;
pub use node::Node;

/// The normalized result of processing one fetched page.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProcessedPage {
    pub title: Option<String>,
    pub structure: Node,
    pub raw_links: Vec<String>,
    pub content_type: String,
    pub source_url: mirrordocs_url::URLInfo,
}

/// Converts a fetched document's body into a [`ProcessedPage`].
#[async_trait]
pub trait ContentProcessor: Send + Sync {
    async fn process(
        &self,
        body: &[u8],
        base: &mirrordocs_url::URLInfo,
        content_type: &str,
    ) -> Result<ProcessedPage, String>;

    fn name(&self) -> &str;
}
