//! Default [`ContentProcessor`](crate::ContentProcessor) implementation.
//!
//! Readability heuristics grounded on the teacher's `GenericAdapter`
//! (`crawler/src/adapters/generic.rs`): try `main`, `article`,
//! `[role="main"]`, `.content` in order, falling back to `<body>` with
//! nav/header/footer/aside/script/style stripped.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use crate::node::Node;
use crate::{ContentProcessor, ProcessedPage};

const CONTENT_SELECTORS: &[&str] = &["main", "article", r#"[role="main"]"#, ".content"];
const CHROME_SELECTOR: &str = "nav, header, footer, aside, script, style, .sidebar, .nav";

/// Readability-style HTML processor; the crawler's built-in, always-matching
/// default. A richer, platform-aware processor is explicitly out of scope.
#[derive(Debug, Default)]
pub struct HtmlContentProcessor;

#[async_trait]
impl ContentProcessor for HtmlContentProcessor {
    async fn process(
        &self,
        body: &[u8],
        base: &mirrordocs_url::URLInfo,
        content_type: &str,
    ) -> Result<ProcessedPage, String> {
        let text = String::from_utf8_lossy(body);
        let doc = Html::parse_document(&text);

        let title = extract_title(&doc);
        let content_root = find_content_root(&doc);

        let structure = match content_root {
            Some(el) => build_node(el),
            None => Node::Other { children: Vec::new() },
        };

        let raw_links = crate::node::extract_links(&structure);

        Ok(ProcessedPage {
            title,
            structure,
            raw_links,
            content_type: content_type.to_string(),
            source_url: base.clone(),
        })
    }

    fn name(&self) -> &str {
        "generic"
    }
}

fn extract_title(doc: &Html) -> Option<String> {
    let h1 = Selector::parse("h1").ok()?;
    doc.select(&h1)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            let title_sel = Selector::parse("title").ok()?;
            doc.select(&title_sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

fn find_content_root(doc: &Html) -> Option<ElementRef<'_>> {
    for sel_str in CONTENT_SELECTORS {
        if let Ok(sel) = Selector::parse(sel_str)
            && let Some(el) = doc.select(&sel).next()
        {
            return Some(el);
        }
    }
    Selector::parse("body").ok().and_then(|sel| doc.select(&sel).next())
}

/// Build a [`Node`] tree from a parsed subtree, skipping chrome elements
/// (nav/header/footer/aside/script/style/.sidebar/.nav) entirely.
fn build_node(el: ElementRef<'_>) -> Node {
    let tag = el.value().name();

    if is_chrome_element(el) {
        return Node::Other { children: Vec::new() };
    }

    if tag == "a" {
        let href = el.value().attr("href").unwrap_or("").to_string();
        return Node::Link { href };
    }

    let children: Vec<Node> = el
        .children()
        .filter_map(|child| {
            if let Some(child_el) = ElementRef::wrap(child) {
                if is_chrome_element(child_el) {
                    None
                } else {
                    Some(build_node(child_el))
                }
            } else if let Some(text) = child.value().as_text() {
                let value = text.trim().to_string();
                if value.is_empty() {
                    None
                } else {
                    Some(Node::Text { value })
                }
            } else {
                None
            }
        })
        .collect();

    match tag {
        "section" | "div" => Node::Section { children },
        "p" => Node::Paragraph { children },
        _ => Node::Other { children },
    }
}

fn is_chrome_element(el: ElementRef<'_>) -> bool {
    let Ok(sel) = Selector::parse(CHROME_SELECTOR) else {
        return false;
    };
    sel.matches(&el)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> mirrordocs_url::URLInfo {
        mirrordocs_url::URLInfo::parse("https://docs.example.com/guide", None)
    }

    #[tokio::test]
    async fn extracts_title_from_h1() {
        let html = r#"<html><body><main><h1>Getting Started</h1><p>hi</p></main></body></html>"#;
        let processor = HtmlContentProcessor;
        let page = processor.process(html.as_bytes(), &url(), "text/html").await.unwrap();
        assert_eq!(page.title.as_deref(), Some("Getting Started"));
    }

    #[tokio::test]
    async fn collects_links_from_main_content() {
        let html = r#"
            <html><body>
                <nav><a href="/should-not-appear">nav link</a></nav>
                <main>
                    <p>intro <a href="/guide/one">one</a></p>
                    <section><a href="/guide/two">two</a></section>
                </main>
            </body></html>
        "#;
        let processor = HtmlContentProcessor;
        let page = processor.process(html.as_bytes(), &url(), "text/html").await.unwrap();
        assert!(page.raw_links.contains(&"/guide/one".to_string()));
        assert!(page.raw_links.contains(&"/guide/two".to_string()));
        assert!(!page.raw_links.contains(&"/should-not-appear".to_string()));
    }

    #[tokio::test]
    async fn falls_back_to_body_when_no_content_container() {
        let html = r#"<html><body><p>just a body <a href="/x">x</a></p></body></html>"#;
        let processor = HtmlContentProcessor;
        let page = processor.process(html.as_bytes(), &url(), "text/html").await.unwrap();
        assert!(page.raw_links.contains(&"/x".to_string()));
    }
}
