//! Profile enrichment pipeline
//!
//! Orchestrates one full run: scrape the primary profile page, draft a
//! Person JSON with the model, search the web for corroborating pages,
//! scrape those, refine the draft, then fold deterministically-extracted
//! credits back in and persist the result.
//!
//! The pipeline talks to its collaborators through small async traits so
//! tests can swap in canned implementations; production wiring uses the
//! concrete scraper, search client, synthesizer and file store.

use crate::credits::build_credits_from_scrapes;
use crate::error::{Error, Result};
use crate::merge::merge_unique_by_key;
use crate::profile::{PersonProfile, RunStats};
use crate::scrape::{ScrapeError, ScrapedPage, Scraper};
use crate::search::{SearchClient, SearchError, SecondarySource};
use crate::store::{FileStore, StoreError, new_run_id};
use crate::synthesis::{SynthesisError, Synthesizer};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Concurrent secondary-page scrapes
const SECONDARY_SCRAPE_CONCURRENCY: usize = 4;

/// Fetches and parses a single web page.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> std::result::Result<ScrapedPage, ScrapeError>;
}

#[async_trait]
impl PageSource for Scraper {
    async fn fetch(&self, url: &str) -> std::result::Result<ScrapedPage, ScrapeError> {
        self.scrape(url).await
    }
}

/// Finds candidate secondary sources for a query.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(
        &self,
        query: &str,
        origin_url: &str,
    ) -> std::result::Result<Vec<SecondarySource>, SearchError>;
}

#[async_trait]
impl WebSearch for SearchClient {
    async fn search(
        &self,
        query: &str,
        origin_url: &str,
    ) -> std::result::Result<Vec<SecondarySource>, SearchError> {
        SearchClient::search(self, query, origin_url).await
    }
}

/// Drafts and refines Person JSON with a model.
#[async_trait]
pub trait ProfileSynthesis: Send + Sync {
    async fn generate(
        &self,
        page: &ScrapedPage,
        industry: &str,
    ) -> std::result::Result<Value, SynthesisError>;

    async fn refine(
        &self,
        profile: &Value,
        pages: &[ScrapedPage],
        industry: &str,
    ) -> std::result::Result<Value, SynthesisError>;
}

#[async_trait]
impl ProfileSynthesis for Synthesizer {
    async fn generate(
        &self,
        page: &ScrapedPage,
        industry: &str,
    ) -> std::result::Result<Value, SynthesisError> {
        self.generate_profile(page, industry).await
    }

    async fn refine(
        &self,
        profile: &Value,
        pages: &[ScrapedPage],
        industry: &str,
    ) -> std::result::Result<Value, SynthesisError> {
        self.refine_profile(profile, pages, industry).await
    }
}

/// Persists finished profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn save(
        &self,
        id: &str,
        profile: &PersonProfile,
    ) -> std::result::Result<PathBuf, StoreError>;
}

#[async_trait]
impl ProfileStore for FileStore {
    async fn save(
        &self,
        id: &str,
        profile: &PersonProfile,
    ) -> std::result::Result<PathBuf, StoreError> {
        FileStore::save(self, id, profile).await
    }
}

/// Result of a completed pipeline run.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub profile: PersonProfile,
    pub run_id: String,
    pub saved_to: PathBuf,
    pub stats: RunStats,
}

/// The enrichment pipeline.
pub struct Pipeline {
    pages: Arc<dyn PageSource>,
    search: Arc<dyn WebSearch>,
    synthesis: Arc<dyn ProfileSynthesis>,
    store: Arc<dyn ProfileStore>,
}

impl Pipeline {
    pub fn new(
        pages: Arc<dyn PageSource>,
        search: Arc<dyn WebSearch>,
        synthesis: Arc<dyn ProfileSynthesis>,
        store: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            pages,
            search,
            synthesis,
            store,
        }
    }

    /// Run the full pipeline for one person.
    ///
    /// `profile_url` is the primary grounding page; `industry_context` is a
    /// free-text hint (for example "film") used in prompts and the search
    /// query. Failures in individual secondary scrapes are skipped; every
    /// other step is fatal to the run.
    #[instrument(skip(self), level = "debug")]
    pub async fn run(&self, profile_url: &str, industry_context: &str) -> Result<PipelineOutcome> {
        if profile_url.trim().is_empty() || industry_context.trim().is_empty() {
            return Err(Error::InvalidRequest(
                "profile URL and industry context are required".to_string(),
            ));
        }

        let primary = self.pages.fetch(profile_url).await?;
        info!(url = %primary.url, domain = ?primary.domain, "primary page scraped");

        let initial = self.synthesis.generate(&primary, industry_context).await?;

        let query = build_search_query(&initial, industry_context)?;
        debug!(query = %query, "searching for secondary sources");
        let results = self.search.search(&query, profile_url).await?;
        info!(found = results.len(), "secondary sources found");

        let secondaries = self.scrape_secondaries(&results).await;

        let local =
            build_credits_from_scrapes(std::iter::once(&primary).chain(secondaries.iter()));

        let refined = self
            .synthesis
            .refine(&initial, &secondaries, industry_context)
            .await?;
        let mut profile = PersonProfile::from_value(refined)?;

        merge_unique_by_key(&mut profile.credits, local.credits.clone(), |c| {
            c.title.as_deref()
        });
        merge_unique_by_key(&mut profile.projects, local.projects.clone(), |p| {
            p.name.as_deref()
        });

        if profile.image.as_deref().map_or(true, str::is_empty) {
            profile.image = primary.image_hint();
        }

        let stats = RunStats {
            secondary_sources_found: results.len(),
            secondary_sources_scraped: secondaries.len(),
            local_credits: local.credits.len(),
            local_projects: local.projects.len(),
        };

        let run_id = new_run_id();
        let saved_to = self.store.save(&run_id, &profile).await?;
        info!(run_id = %run_id, saved_to = %saved_to.display(), "profile saved");

        Ok(PipelineOutcome {
            profile,
            run_id,
            saved_to,
            stats,
        })
    }

    /// Scrape secondary sources with bounded concurrency, keeping search
    /// order. Pages that fail to scrape are dropped with a warning.
    async fn scrape_secondaries(&self, results: &[SecondarySource]) -> Vec<ScrapedPage> {
        let fetched: Vec<_> = stream::iter(results.iter().map(|result| {
            let pages = Arc::clone(&self.pages);
            let url = result.url.clone();
            async move { (url.clone(), pages.fetch(&url).await) }
        }))
        .buffered(SECONDARY_SCRAPE_CONCURRENCY)
        .collect()
        .await;

        let mut pages = Vec::new();
        for (url, outcome) in fetched {
            match outcome {
                Ok(page) => pages.push(page),
                Err(e) => warn!(url = %url, error = %e, "skipping secondary source"),
            }
        }
        pages
    }
}

/// First few tokens of the profile's name, with quote characters stripped.
fn shorten_name_for_query(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '"' | '\'' | '\u{201c}' | '\u{201d}' | '\u{2018}' | '\u{2019}' => ' ',
            c => c,
        })
        .collect();
    cleaned
        .split_whitespace()
        .take(3)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Search query from the initial profile's name plus the industry context.
fn build_search_query(initial: &Value, industry_context: &str) -> Result<String> {
    let name = initial
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim();
    let short = shorten_name_for_query(name);

    let query = [short.as_str(), industry_context.trim()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();

    if query.is_empty() {
        return Err(Error::InvalidRequest(
            "empty search query computed from initial profile name".to_string(),
        ));
    }
    Ok(query)
}
