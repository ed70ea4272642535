//! Error types for the search module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Errors that can occur during secondary-source search
#[derive(Debug, Error)]
pub enum SearchError {
    /// The query normalized to an empty string
    #[error("search query was empty after normalization")]
    EmptyQuery,

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned a non-success status
    #[error("search provider returned {status}: {body}")]
    Provider {
        /// HTTP status code
        status: u16,
        /// Response body, truncated
        body: String,
    },
}

impl SearchError {
    /// Whether this is the provider's "query rejected" response, which is
    /// worth exactly one retry with a shrunk query.
    pub fn is_query_rejected(&self) -> bool {
        matches!(self, SearchError::Provider { status: 422, .. })
    }
}

impl From<SearchError> for CrateError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Http(e) => CrateError::Http(e),
            _ => CrateError::Search(err.to_string()),
        }
    }
}
