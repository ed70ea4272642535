//! Generic HTML extraction for scraped pages
//!
//! Pulls the three page-agnostic layers out of a document: embedded JSON-LD
//! blocks, the fixed whitelist of Open-Graph/Twitter meta tags, and the
//! main textual content. Each extractor is best-effort and independent; a
//! failure in one never aborts the others.

use crate::scrape::PageMeta;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::debug;

/// Elements whose text never belongs to the page's main content.
const EXCLUDED_TAGS: [&str; 6] = ["script", "style", "nav", "header", "footer", "noscript"];

pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Extract every JSON-LD block from the document, flattening top-level
/// arrays into a flat ordered sequence. Blocks that fail to parse are
/// skipped.
pub fn extract_json_ld(document: &Html) -> Vec<Value> {
    let script_selector = selector(r#"script[type="application/ld+json"]"#);
    let mut blocks = Vec::new();

    for script in document.select(&script_selector) {
        let raw: String = script.text().collect();
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => blocks.extend(items),
            Ok(value) => blocks.push(value),
            Err(e) => debug!("skipping unparseable JSON-LD block: {}", e),
        }
    }

    blocks
}

/// Extract the fixed whitelist of Open-Graph and Twitter-card meta tags.
pub fn extract_meta(document: &Html) -> PageMeta {
    PageMeta {
        og_title: meta_content(document, r#"meta[property="og:title"]"#),
        og_description: meta_content(document, r#"meta[property="og:description"]"#),
        og_image: meta_content(document, r#"meta[property="og:image"]"#),
        twitter_title: meta_content(document, r#"meta[name="twitter:title"]"#),
        twitter_description: meta_content(document, r#"meta[name="twitter:description"]"#),
        twitter_image: meta_content(document, r#"meta[name="twitter:image"]"#)
            .or_else(|| meta_content(document, r#"meta[name="twitter:image:src"]"#)),
    }
}

fn meta_content(document: &Html, css: &str) -> Option<String> {
    document
        .select(&selector(css))
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Extract the main textual content of the page, whitespace-collapsed.
///
/// Prefers `<main>`, then `<article>`, then the full `<body>`, taking the
/// first region that yields any text. Script/style/nav/header/footer
/// subtrees are excluded wherever they appear.
pub fn extract_main_text(document: &Html) -> String {
    for css in ["main", "article", "body"] {
        if let Some(root) = document.select(&selector(css)).next() {
            let mut buf = String::new();
            collect_text(root, &mut buf);
            let text = collapse_whitespace(&buf);
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}

fn collect_text(element: ElementRef<'_>, buf: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            buf.push_str(text);
            buf.push(' ');
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if !EXCLUDED_TAGS.contains(&child_el.value().name()) {
                collect_text(child_el, buf);
            }
        }
    }
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
