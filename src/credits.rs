//! Deterministic credit extraction from scraped pages
//!
//! Scraped pages carry credits two ways: site-specific extraction (IMDb
//! filmography rows, Wikipedia filmography tables) and raw JSON-LD blocks.
//! This module folds both into a single `LocalCredits` set that is merged
//! into the final profile regardless of what the model produced, so a
//! flaky model run can never lose deterministically-scraped credits.

use crate::merge::merge_unique_by_key;
use crate::profile::{Credit, Project};
use crate::scrape::ScrapedPage;
use regex::Regex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::LazyLock;
use tracing::debug;

/// JSON-LD `@type` values treated as creative works
const CREATIVE_WORK_TYPES: &[&str] = &[
    "CreativeWork",
    "Movie",
    "TVSeries",
    "TVEpisode",
    "VideoObject",
    "MovieSeries",
    "Episode",
];

static RE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19|20)\d{2}\b").expect("static regex"));

/// Credits and projects recovered without any model involvement.
#[derive(Debug, Default, Clone)]
pub struct LocalCredits {
    pub credits: Vec<Credit>,
    pub projects: Vec<Project>,
}

/// Build local credits from a set of scraped pages.
///
/// Per page, site-specific extracted credits win; the generic JSON-LD scan
/// runs for pages whose parser produced none (a LinkedIn profile, say,
/// never carries a filmography, but its JSON-LD may still name works).
/// Dedupe is by exact title (credits) and name (projects), first
/// occurrence wins.
pub fn build_credits_from_scrapes<'a, I>(pages: I) -> LocalCredits
where
    I: IntoIterator<Item = &'a ScrapedPage>,
{
    let mut out = LocalCredits::default();

    for page in pages {
        let extracted_credits = page.credit_hints();
        if !extracted_credits.is_empty() {
            let credits: Vec<Credit> = extracted_credits.iter().map(normalize_credit).collect();
            let projects: Vec<Project> =
                credits.iter().filter_map(Credit::to_project).collect();
            merge_unique_by_key(&mut out.credits, credits, |c| c.title.as_deref());
            merge_unique_by_key(&mut out.projects, projects, |p| p.name.as_deref());
            continue;
        }

        let found = scan_json_ld(&page.json_ld);
        if !found.is_empty() {
            debug!(url = %page.url, count = found.len(), "creative works from JSON-LD");
            let projects: Vec<Project> = found.iter().filter_map(Credit::to_project).collect();
            merge_unique_by_key(&mut out.credits, found, |c| c.title.as_deref());
            merge_unique_by_key(&mut out.projects, projects, |p| p.name.as_deref());
        }
    }

    out
}

/// Normalize a scraped credit: empty strings become None.
fn normalize_credit(credit: &Credit) -> Credit {
    Credit {
        title: non_empty(&credit.title),
        year: non_empty(&credit.year),
        url: non_empty(&credit.url),
        role: non_empty(&credit.role),
        department: non_empty(&credit.department),
        kind: non_empty(&credit.kind),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|s| !s.is_empty()).map(str::to_owned)
}

/// Breadth-first scan of JSON-LD blocks for creative-work nodes.
///
/// Follows `@graph` and every nested object or array, visiting each node
/// once. Anything whose `@type` names a creative work becomes a credit.
fn scan_json_ld(blocks: &[Value]) -> Vec<Credit> {
    let mut out = Vec::new();
    let mut queue: VecDeque<&Value> = blocks.iter().collect();

    while let Some(node) = queue.pop_front() {
        match node {
            Value::Array(items) => queue.extend(items.iter()),
            Value::Object(map) => {
                if is_creative_work(node) {
                    out.push(credit_from_node(node));
                }
                // "@graph" members are plain values too, so this visits
                // them once without special casing
                for value in map.values() {
                    if value.is_object() || value.is_array() {
                        queue.push_back(value);
                    }
                }
            }
            _ => {}
        }
    }

    out
}

fn type_names(node: &Value) -> Vec<&str> {
    match node.get("@type") {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn is_creative_work(node: &Value) -> bool {
    type_names(node)
        .iter()
        .any(|t| CREATIVE_WORK_TYPES.contains(t))
}

fn credit_from_node(node: &Value) -> Credit {
    let title = ["name", "headline", "alternateName"]
        .iter()
        .find_map(|field| str_field(node, field));

    let year = ["datePublished", "dateCreated"]
        .iter()
        .find_map(|field| str_field(node, field))
        .and_then(|date| RE_YEAR.find(&date).map(|m| m.as_str().to_owned()));

    Credit {
        title,
        year,
        url: str_field(node, "url"),
        role: None,
        department: None,
        kind: type_names(node).first().map(|t| (*t).to_owned()),
    }
}

fn str_field(node: &Value, field: &str) -> Option<String> {
    node.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::parse_page;
    use serde_json::json;

    fn page_with_json_ld(url: &str, block: Value) -> ScrapedPage {
        let html = format!(
            "<html><head><script type=\"application/ld+json\">{}</script></head><body><main>x</main></body></html>",
            block
        );
        parse_page(url, &html)
    }

    #[test]
    fn test_scan_finds_movie_in_graph() {
        let blocks = vec![json!({
            "@context": "https://schema.org",
            "@graph": [
                {"@type": "Person", "name": "Jane Doe"},
                {"@type": "Movie", "name": "First Feature", "datePublished": "2019-05-01", "url": "https://example.com/m"}
            ]
        })];
        let credits = scan_json_ld(&blocks);
        assert_eq!(credits.len(), 1);
        assert_eq!(credits[0].title.as_deref(), Some("First Feature"));
        assert_eq!(credits[0].year.as_deref(), Some("2019"));
        assert_eq!(credits[0].kind.as_deref(), Some("Movie"));
    }

    #[test]
    fn test_scan_handles_type_arrays_and_nesting() {
        let blocks = vec![json!({
            "@type": "Person",
            "name": "Jane Doe",
            "performerIn": [
                {"@type": ["TVSeries", "CreativeWork"], "name": "Show", "dateCreated": "1998"}
            ]
        })];
        let credits = scan_json_ld(&blocks);
        assert_eq!(credits.len(), 1);
        assert_eq!(credits[0].title.as_deref(), Some("Show"));
        assert_eq!(credits[0].year.as_deref(), Some("1998"));
        assert_eq!(credits[0].kind.as_deref(), Some("TVSeries"));
    }

    #[test]
    fn test_scan_ignores_non_creative_nodes() {
        let blocks = vec![json!({
            "@type": "Organization",
            "name": "Studio",
            "employee": {"@type": "Person", "name": "Jane Doe"}
        })];
        assert!(scan_json_ld(&blocks).is_empty());
    }

    #[test]
    fn test_headline_fallback_for_title() {
        let blocks = vec![json!({"@type": "Movie", "headline": "Untitled Project"})];
        let credits = scan_json_ld(&blocks);
        assert_eq!(credits[0].title.as_deref(), Some("Untitled Project"));
    }

    #[test]
    fn test_json_ld_scan_skipped_when_extraction_succeeded() {
        // IMDb-shaped page: filmography rows produce extracted credits, so
        // the Movie JSON-LD block on the same page must not double them.
        let html = r#"<html><head>
            <script type="application/ld+json">{"@type": "Movie", "name": "From JSON-LD"}</script>
            </head><body>
            <h1><span class="hero__primary-text">Jane Doe</span></h1>
            <div class="filmo-row"><b><a href="/title/tt1/">Scraped Film</a></b><span class="year_column">2020</span></div>
            </body></html>"#;
        let page = parse_page("https://www.imdb.com/name/nm1/", html);
        assert!(page.extracted.is_some());

        let local = build_credits_from_scrapes([&page]);
        let titles: Vec<_> = local
            .credits
            .iter()
            .filter_map(|c| c.title.as_deref())
            .collect();
        assert!(titles.contains(&"Scraped Film"));
        assert!(!titles.contains(&"From JSON-LD"));
    }

    #[test]
    fn test_json_ld_scan_runs_when_extraction_has_no_credits() {
        // LinkedIn-shaped page: the domain parser fills in the person but
        // never any credits, so CreativeWork JSON-LD must still be scanned.
        let html = r#"<html><head>
            <script type="application/ld+json">{"@type": "Person", "name": "Jane Doe"}</script>
            <script type="application/ld+json">{"@type": "Movie", "name": "Indie Feature", "datePublished": "2021"}</script>
            </head><body><main>profile</main></body></html>"#;
        let page = parse_page("https://www.linkedin.com/in/janedoe/", html);
        let extracted = page.extracted.as_ref().unwrap();
        assert!(extracted.credits.is_empty());

        let local = build_credits_from_scrapes([&page]);
        assert_eq!(local.credits.len(), 1);
        assert_eq!(local.credits[0].title.as_deref(), Some("Indie Feature"));
        assert_eq!(local.credits[0].year.as_deref(), Some("2021"));
    }

    #[test]
    fn test_credits_mirror_to_projects_and_dedupe_across_pages() {
        let a = page_with_json_ld(
            "https://a.com/1",
            json!({"@type": "Movie", "name": "Shared Title", "datePublished": "2015"}),
        );
        let b = page_with_json_ld(
            "https://b.com/2",
            json!({"@graph": [
                {"@type": "Movie", "name": "Shared Title"},
                {"@type": "TVSeries", "name": "Only Here"}
            ]}),
        );

        let local = build_credits_from_scrapes([&a, &b]);
        assert_eq!(local.credits.len(), 2);
        assert_eq!(local.projects.len(), 2);
        // first occurrence of "Shared Title" kept its year
        assert_eq!(local.credits[0].year.as_deref(), Some("2015"));
        assert_eq!(local.projects[0].name.as_deref(), Some("Shared Title"));
    }

    #[test]
    fn test_untitled_credits_do_not_become_projects() {
        let page = page_with_json_ld(
            "https://a.com/1",
            json!({"@type": "Movie", "url": "https://example.com/mystery"}),
        );
        let local = build_credits_from_scrapes([&page]);
        assert_eq!(local.credits.len(), 1);
        assert!(local.credits[0].title.is_none());
        assert!(local.projects.is_empty());
    }
}
