//! Error types for the synthesis module

use thiserror::Error;

/// Errors from the language-model synthesis step
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the model API
    #[error("model API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The model answered but its text could not be read as a JSON object
    #[error("could not parse model output as JSON: {0}")]
    Parse(String),

    /// The response carried no candidate text at all
    #[error("model returned no candidates")]
    Empty,
}

impl From<SynthesisError> for crate::error::Error {
    fn from(err: SynthesisError) -> Self {
        match err {
            SynthesisError::Http(e) => crate::error::Error::Http(e),
            other => crate::error::Error::Synthesis(other.to_string()),
        }
    }
}
