//! # Dossier - Person Profile Enrichment
//!
//! This crate builds enriched [schema.org Person](https://schema.org/Person)
//! profiles from public web sources. Starting from a single grounding URL
//! (an IMDb, Wikipedia or LinkedIn page, or any biography page), it scrapes
//! the page, drafts a profile with the Gemini API, discovers corroborating
//! pages through web search, scrapes those too, and refines the draft with
//! everything found. Credits and projects are additionally extracted
//! deterministically from structured page data and merged into the final
//! profile, so a weak model run never loses them.
//!
//! ## Features
//!
//! - Site-aware scraping with JSON-LD, OpenGraph and main-text extraction
//! - LLM synthesis into schema.org Person JSON with custom credit arrays
//! - Web search for secondary sources, with origin-domain filtering
//! - Deterministic credit/project extraction and key-based merging
//! - Pretty-printed JSON persistence, one file per run
//! - Async API with Tokio
//!
//! ## Example
//!
//! ```rust,no_run
//! use dossier::pipeline::Pipeline;
//! use dossier::scrape::Scraper;
//! use dossier::search::{SearchClient, SearchConfig};
//! use dossier::store::FileStore;
//! use dossier::synthesis::{SynthesisConfig, Synthesizer};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = Pipeline::new(
//!         Arc::new(Scraper::new()?),
//!         Arc::new(SearchClient::new(SearchConfig::new("brave-api-key"))?),
//!         Arc::new(Synthesizer::new(SynthesisConfig::new("gemini-api-key"))?),
//!         Arc::new(FileStore::new()),
//!     );
//!
//!     let outcome = pipeline
//!         .run("https://www.imdb.com/name/nm0000001/", "film")
//!         .await?;
//!
//!     println!("saved {} to {}", outcome.run_id, outcome.saved_to.display());
//!     Ok(())
//! }
//! ```

mod error;

pub mod credits;
pub mod merge;
pub mod pipeline;
pub mod profile;
pub mod scrape;
pub mod search;
pub mod store;
pub mod synthesis;

pub use error::{Error, Result};
