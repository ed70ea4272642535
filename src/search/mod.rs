//! Secondary-source web search
//!
//! This module finds corroborating pages about a person through a
//! Brave-style web-search API. Queries are normalized before they go out
//! (the provider chokes on quotes, very long strings, and some non-ASCII
//! input), a 422 "query rejected" response gets exactly one retry with a
//! shrunk query, and results pointing back at the origin domain are
//! filtered so the primary source never doubles as a secondary one.

mod error;

pub use error::SearchError;

use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use unicode_normalization::UnicodeNormalization;
use url::Url;

/// Default timeout for provider calls in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Hard cap the provider places on query length
const MAX_QUERY_CHARS: usize = 120;

/// A candidate secondary source returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondarySource {
    pub title: String,
    pub url: String,
    pub description: String,
}

/// Configuration for the search client
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Provider API key
    pub api_key: String,

    /// Provider base URL
    pub base_url: String,

    /// Timeout for each provider call
    pub timeout: Duration,

    /// Results to request, clamped to the provider's 1..=20 range
    pub max_results: u8,
}

impl SearchConfig {
    /// Create a configuration with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.search.brave.com".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_results: 20,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    #[serde(default)]
    web: Option<WebResults>,
}

#[derive(Debug, Deserialize)]
struct WebResults {
    #[serde(default)]
    results: Vec<ProviderResult>,
}

#[derive(Debug, Deserialize)]
struct ProviderResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Client for the web-search provider.
#[derive(Clone)]
pub struct SearchClient {
    client: reqwest::Client,
    config: SearchConfig,
}

impl SearchClient {
    /// Create a new search client.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("dossier/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    /// Search for secondary sources about a person.
    ///
    /// `origin_url` is the primary profile URL; results on its domain are
    /// excluded. An empty result list is a valid outcome, not an error.
    #[instrument(skip(self), level = "debug")]
    pub async fn search(
        &self,
        query: &str,
        origin_url: &str,
    ) -> Result<Vec<SecondarySource>, SearchError> {
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let response = match self.call_provider(&normalized, self.config.max_results).await {
            Ok(response) => response,
            Err(err) if err.is_query_rejected() => {
                // 422 is usually odd characters or query structure; retry
                // once with just the leading tokens.
                let shrunk = shrink_query(&normalized);
                warn!(original = %normalized, shrunk = %shrunk, "query rejected, retrying shrunk");
                self.call_provider(&shrunk, 10).await?
            }
            Err(err) => return Err(err),
        };

        let results = response.web.map(|w| w.results).unwrap_or_default();
        debug!(count = results.len(), "provider returned results");

        Ok(filter_results(results, origin_url))
    }

    async fn call_provider(&self, query: &str, count: u8) -> Result<ProviderResponse, SearchError> {
        let count = count.clamp(1, 20);
        let response = self
            .client
            .get(format!("{}/res/v1/web/search", self.config.base_url))
            .query(&[("q", query), ("count", &count.to_string())])
            .header("X-Subscription-Token", &self.config.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(400)
                .collect();
            return Err(SearchError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

/// Normalize a raw query into something the provider will accept: no
/// quotes, collapsed whitespace, at most 120 chars, ASCII only. Accented
/// letters are decomposed first so "Jané" survives as "Jane" rather than
/// being dropped outright.
pub fn normalize_query(query: &str) -> String {
    let unquoted: String = query
        .chars()
        .map(|c| match c {
            '"' | '\'' | '\u{201c}' | '\u{201d}' | '\u{2018}' | '\u{2019}' => ' ',
            c => c,
        })
        .collect();
    let collapsed = unquoted.split_whitespace().collect::<Vec<_>>().join(" ");
    let capped: String = collapsed.chars().take(MAX_QUERY_CHARS).collect();
    capped
        .nfkd()
        .filter(char::is_ascii)
        .collect::<String>()
        .trim()
        .to_owned()
}

/// Keep only the first two or three whitespace-separated tokens.
fn shrink_query(normalized: &str) -> String {
    normalized
        .split_whitespace()
        .take(3)
        .collect::<Vec<_>>()
        .join(" ")
}

fn host_minus_www(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_owned())
}

fn filter_results(results: Vec<ProviderResult>, origin_url: &str) -> Vec<SecondarySource> {
    let origin_host = host_minus_www(origin_url);

    let mut seen = HashSet::new();
    let mut filtered = Vec::new();

    for result in results {
        let Some(url) = result.url else { continue };

        if let (Some(origin), Some(host)) = (origin_host.as_deref(), host_minus_www(&url)) {
            if host.contains(origin) {
                continue;
            }
        }

        if !seen.insert(url.clone()) {
            continue;
        }

        filtered.push(SecondarySource {
            title: result.title.unwrap_or_default(),
            url,
            description: result.description.unwrap_or_default(),
        });
    }

    filtered
}
