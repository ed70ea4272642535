//! Error types for the scrape module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for page scraping operations
///
/// A scrape failure is not inherently fatal: the orchestrator skips failed
/// secondary sources and only aborts when the primary page fails.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// HTTP client error (network failure, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success, non-redirect response status
    #[error("unexpected status {status} fetching {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// The URL that was fetched
        url: String,
    },

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl From<ScrapeError> for CrateError {
    fn from(err: ScrapeError) -> Self {
        match err {
            ScrapeError::Http(e) => CrateError::Http(e),
            _ => CrateError::Scrape(err.to_string()),
        }
    }
}
