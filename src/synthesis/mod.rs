//! Profile synthesis through the Gemini API
//!
//! Turns scraped pages into a schema.org Person JSON object: one call to
//! draft the profile from the primary page, one to refine it with
//! whatever the secondary pages add. The model is asked for JSON output
//! but occasionally wraps it in prose anyway, so parsing falls back to the
//! first `{` in the reply before giving up.

mod error;
mod http;
mod prompt;

pub use error::SynthesisError;

use crate::scrape::ScrapedPage;
use http::GenerateClient;
use serde_json::Value;
use std::time::Duration;
use tracing::{instrument, warn};

/// Default model when none is configured
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default timeout for model calls in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the synthesizer
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    /// Gemini API key
    pub api_key: String,

    /// Model name, e.g. "gemini-1.5-flash"
    pub model: String,

    /// Timeout for each model call
    pub timeout: Duration,
}

impl SynthesisConfig {
    /// Create a configuration with the default model and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Use a different model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Builds and refines Person profiles with a language model.
#[derive(Clone)]
pub struct Synthesizer {
    client: GenerateClient,
}

#[cfg(test)]
impl Synthesizer {
    /// Point the client at a mock server (for testing only).
    pub fn set_base_url(&mut self, url: String) {
        self.client.set_base_url(url);
    }
}

impl Synthesizer {
    /// Create a new synthesizer.
    pub fn new(config: SynthesisConfig) -> Result<Self, SynthesisError> {
        let client = GenerateClient::new(config.api_key, config.model, config.timeout)?;
        Ok(Self { client })
    }

    /// Draft an initial profile from the primary page.
    #[instrument(skip(self, page), fields(url = %page.url), level = "debug")]
    pub async fn generate_profile(
        &self,
        page: &ScrapedPage,
        industry: &str,
    ) -> Result<Value, SynthesisError> {
        let prompt = prompt::person_prompt(page, industry);
        let text = self.client.generate(&prompt).await?;
        recover_json(&text)
    }

    /// Refine an existing profile with secondary page data.
    ///
    /// The model is consulted even with no secondary pages; the refinement
    /// pass also cleans up the draft itself.
    #[instrument(skip(self, profile, pages), fields(pages = pages.len()), level = "debug")]
    pub async fn refine_profile(
        &self,
        profile: &Value,
        pages: &[ScrapedPage],
        industry: &str,
    ) -> Result<Value, SynthesisError> {
        let prompt = prompt::refine_prompt(profile, pages, industry);
        let text = self.client.generate(&prompt).await?;
        recover_json(&text)
    }
}

/// Parse model output into a JSON object, tolerating leading prose or a
/// code fence by retrying from the first `{`.
fn recover_json(text: &str) -> Result<Value, SynthesisError> {
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(text) {
        return Ok(value);
    }
    if let Some(start) = text.find('{') {
        let candidate = text[start..].trim_end().trim_end_matches('`');
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(candidate) {
            warn!("model output needed recovery from offset {}", start);
            return Ok(value);
        }
    }
    Err(SynthesisError::Parse(
        text.chars().take(200).collect::<String>(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::parse_page;
    use serde_json::json;

    #[test]
    fn test_recover_json_clean() {
        let value = recover_json("{\"name\": \"Jane\"}").unwrap();
        assert_eq!(value["name"], "Jane");
    }

    #[test]
    fn test_recover_json_with_prose_prefix() {
        let value = recover_json("Here is the profile:\n{\"name\": \"Jane\"}").unwrap();
        assert_eq!(value["name"], "Jane");
    }

    #[test]
    fn test_recover_json_fenced() {
        let value = recover_json("```json\n{\"name\": \"Jane\"}\n```").unwrap();
        assert_eq!(value["name"], "Jane");
    }

    #[test]
    fn test_recover_json_garbage_is_parse_error() {
        let err = recover_json("I could not find this person.").unwrap_err();
        assert!(matches!(err, SynthesisError::Parse(_)));
    }

    #[test]
    fn test_recover_json_rejects_non_object() {
        let err = recover_json("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, SynthesisError::Parse(_)));
    }

    #[tokio::test]
    async fn test_generate_profile_end_to_end() {
        let mut server = mockito::Server::new_async().await;
        let profile = json!({"@type": "Person", "name": "Jane Doe", "credits": []});
        server
            .mock("POST", "/v1beta/models/gemini-1.5-flash:generateContent")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "candidates": [
                        {"content": {"parts": [{"text": profile.to_string()}]}}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let mut synth = Synthesizer::new(SynthesisConfig::new("test-key")).unwrap();
        synth.set_base_url(server.url());

        let page = parse_page(
            "https://example.com/bio",
            "<html><body><main>Jane Doe, director.</main></body></html>",
        );
        let value = synth.generate_profile(&page, "film").await.unwrap();
        assert_eq!(value["name"], "Jane Doe");
    }

    #[tokio::test]
    async fn test_refine_profile_calls_model_without_pages() {
        let mut server = mockito::Server::new_async().await;
        let refined = json!({"@type": "Person", "name": "Jane A. Doe"});
        let mock = server
            .mock("POST", "/v1beta/models/gemini-1.5-flash:generateContent")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "candidates": [
                        {"content": {"parts": [{"text": refined.to_string()}]}}
                    ]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let mut synth = Synthesizer::new(SynthesisConfig::new("test-key")).unwrap();
        synth.set_base_url(server.url());

        let profile = json!({"name": "Jane Doe"});
        let value = synth.refine_profile(&profile, &[], "film").await.unwrap();
        assert_eq!(value["name"], "Jane A. Doe");
        mock.assert_async().await;
    }
}
