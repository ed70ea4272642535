//! Error types for the dossier crate

use thiserror::Error;

/// Result type for dossier operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for dossier operations
///
/// Component modules define their own error enums; the conversions into
/// this type live next to those enums. Every variant here is fatal to a
/// pipeline run; non-fatal conditions (a single secondary scrape failing)
/// are swallowed where they occur and never surface as an `Error`.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Page scraping error (fatal only for the primary profile page)
    #[error("Scrape error: {0}")]
    Scrape(String),

    /// Web search provider error
    #[error("Search error: {0}")]
    Search(String),

    /// Profile synthesis error (model call or JSON parsing)
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// Persistence error
    #[error("Store error: {0}")]
    Store(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
