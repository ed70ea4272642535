//! Page scraping module
//!
//! This module fetches a single profile URL and extracts what the rest of
//! the pipeline needs from it: JSON-LD blocks, Open-Graph/Twitter meta
//! tags, the main textual content, and (for known hosts) domain-specific
//! structured fields.

mod domains;
mod error;
mod extract;

pub use domains::{DomainParser, ParseContext};
pub use error::ScrapeError;
pub use extract::{extract_json_ld, extract_main_text, extract_meta};

use crate::profile::Credit;
use scraper::Html;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Default timeout for page fetches in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Classification of a URL's host into the domains we parse specially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    LinkedIn,
    Imdb,
    Wikipedia,
    Other,
}

impl Domain {
    /// Classify a URL by hostname pattern.
    pub fn classify(url: &str) -> Self {
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_owned))
            .unwrap_or_default();
        let host = host.strip_prefix("www.").unwrap_or(&host);

        if host.contains("linkedin.com") {
            Domain::LinkedIn
        } else if host.contains("imdb.com") {
            Domain::Imdb
        } else if host.contains("wikipedia.org") {
            Domain::Wikipedia
        } else {
            Domain::Other
        }
    }
}

/// Which bespoke parser produced an [`Extracted`] record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileSource {
    LinkedIn,
    Imdb,
    Wikipedia,
}

/// Person details lifted by a domain-specific parser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedPerson {
    pub name: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "jobTitle")]
    pub job_title: Option<String>,
    #[serde(rename = "sameAs", default)]
    pub same_as: Vec<String>,
}

/// Domain-specific structured fields for a scraped page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extracted {
    pub source: ProfileSource,
    pub person: ExtractedPerson,
    #[serde(default)]
    pub credits: Vec<Credit>,
    #[serde(rename = "knownFor", default)]
    pub known_for: Vec<Credit>,
}

/// The fixed whitelist of meta tags we read from a page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageMeta {
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub twitter_title: Option<String>,
    pub twitter_description: Option<String>,
    pub twitter_image: Option<String>,
}

/// Result of scraping one URL. Created fresh per scrape call and never
/// mutated afterwards; downstream steps build new collections from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedPage {
    /// The page that was fetched
    pub url: String,

    /// Plain-text extraction of the page body, whitespace-collapsed
    pub text_content: String,

    /// Parsed JSON-LD objects found in the page, in document order
    pub json_ld: Vec<Value>,

    /// Open-Graph/Twitter meta tags
    pub meta: PageMeta,

    /// Domain classification of the URL
    pub domain: Domain,

    /// Domain-specific structured record, when a bespoke parser succeeded
    pub extracted: Option<Extracted>,
}

impl ScrapedPage {
    /// Best image hint for this page: domain-extracted image first, then
    /// og:image, then twitter:image.
    pub fn image_hint(&self) -> Option<String> {
        self.extracted
            .as_ref()
            .and_then(|e| e.person.image.clone())
            .or_else(|| self.meta.og_image.clone())
            .or_else(|| self.meta.twitter_image.clone())
    }

    /// Domain-extracted credits for this page, empty when none were found.
    pub fn credit_hints(&self) -> &[Credit] {
        self.extracted
            .as_ref()
            .map(|e| e.credits.as_slice())
            .unwrap_or_default()
    }
}

/// Configuration for the scraper
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Timeout for each page fetch
    pub timeout: Duration,

    /// User agent to present. Defaults to a realistic browser UA since
    /// several profile hosts reject obvious bots.
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_5) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// Fetches pages and extracts their content.
#[derive(Clone)]
pub struct Scraper {
    client: reqwest::Client,
}

impl Scraper {
    /// Create a scraper with default configuration.
    pub fn new() -> Result<Self, ScrapeError> {
        Self::with_config(ScraperConfig::default())
    }

    /// Create a scraper with custom configuration.
    pub fn with_config(config: ScraperConfig) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch and parse one page.
    ///
    /// Errors here signal "no data for this URL"; whether that is fatal is
    /// the orchestrator's call.
    #[instrument(skip(self), level = "debug")]
    pub async fn scrape(&self, url: &str) -> Result<ScrapedPage, ScrapeError> {
        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() && !status.is_redirection() {
            return Err(ScrapeError::Status {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.text().await?;
        Ok(parse_page(url, &body))
    }
}

/// Parse an already-fetched HTML body into a [`ScrapedPage`].
///
/// Split out from the network fetch so fixtures can exercise extraction
/// directly.
pub fn parse_page(url: &str, html: &str) -> ScrapedPage {
    let document = Html::parse_document(html);

    let json_ld = extract::extract_json_ld(&document);
    let meta = extract::extract_meta(&document);
    let text_content = extract::extract_main_text(&document);
    let domain = Domain::classify(url);

    let extracted = domains::extract_for_domain(
        domain,
        &ParseContext {
            url,
            document: &document,
            json_ld: &json_ld,
            meta: &meta,
        },
    );

    debug!(
        url,
        json_ld_blocks = json_ld.len(),
        text_len = text_content.len(),
        has_extracted = extracted.is_some(),
        "scraped page"
    );

    ScrapedPage {
        url: url.to_owned(),
        text_content,
        json_ld,
        meta,
        domain,
        extracted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_classification() {
        assert_eq!(
            Domain::classify("https://www.linkedin.com/in/janedoe"),
            Domain::LinkedIn
        );
        assert_eq!(
            Domain::classify("https://www.imdb.com/name/nm0000001/"),
            Domain::Imdb
        );
        assert_eq!(
            Domain::classify("https://en.wikipedia.org/wiki/Jane_Doe"),
            Domain::Wikipedia
        );
        assert_eq!(Domain::classify("https://example.com/bio"), Domain::Other);
        assert_eq!(Domain::classify("not a url"), Domain::Other);
    }

    #[test]
    fn test_parse_page_assembles_all_layers() {
        let html = r#"<html><head>
            <meta property="og:image" content="https://en.wikipedia.org/jane.jpg">
            <script type="application/ld+json">{"@type": "Movie", "name": "Movie A"}</script>
        </head><body>
            <h1 id="firstHeading">Jane Doe</h1>
            <main><p>Jane Doe is a director.</p></main>
        </body></html>"#;

        let page = parse_page("https://en.wikipedia.org/wiki/Jane_Doe", html);
        assert_eq!(page.domain, Domain::Wikipedia);
        assert_eq!(page.json_ld.len(), 1);
        assert_eq!(page.text_content, "Jane Doe is a director.");
        assert_eq!(
            page.meta.og_image.as_deref(),
            Some("https://en.wikipedia.org/jane.jpg")
        );
        let extracted = page.extracted.expect("wikipedia parser should fire");
        assert_eq!(extracted.person.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_image_hint_precedence() {
        let mut page = parse_page("https://example.com/bio", "<html><body>x</body></html>");
        page.meta.og_image = Some("https://example.com/og.jpg".to_owned());
        assert_eq!(page.image_hint().as_deref(), Some("https://example.com/og.jpg"));

        page.extracted = Some(Extracted {
            source: ProfileSource::Imdb,
            person: ExtractedPerson {
                image: Some("https://example.com/hero.jpg".to_owned()),
                ..ExtractedPerson::default()
            },
            credits: Vec::new(),
            known_for: Vec::new(),
        });
        assert_eq!(
            page.image_hint().as_deref(),
            Some("https://example.com/hero.jpg")
        );
    }

    #[tokio::test]
    async fn test_scrape_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/bio")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body><main>Jane Doe, director.</main></body></html>")
            .create_async()
            .await;

        let scraper = Scraper::new().unwrap();
        let page = scraper
            .scrape(&format!("{}/bio", server.url()))
            .await
            .unwrap();

        assert_eq!(page.text_content, "Jane Doe, director.");
        assert_eq!(page.domain, Domain::Other);
        assert!(page.extracted.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_scrape_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gone")
            .with_status(404)
            .with_body("not found")
            .create_async()
            .await;

        let scraper = Scraper::new().unwrap();
        let err = scraper
            .scrape(&format!("{}/gone", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Status { status: 404, .. }));
    }
}
