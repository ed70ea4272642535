//! HTTP client for the Gemini generateContent endpoint
//!
//! Only the one call this crate needs: POST a user prompt, ask for a JSON
//! response, hand back the candidate text. Parsing that text into a
//! profile happens a level up.

use super::error::SynthesisError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig<'a> {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Thin client over the generateContent REST API
#[derive(Clone)]
pub(crate) struct GenerateClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[cfg(test)]
impl GenerateClient {
    /// Set the base URL (for testing only)
    pub(crate) fn set_base_url(&mut self, url: String) {
        self.base_url = url;
    }
}

impl GenerateClient {
    pub(crate) fn new(
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, SynthesisError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key,
            model,
        })
    }

    /// Send a prompt and return the concatenated candidate text.
    #[instrument(skip(self, prompt), level = "debug")]
    pub(crate) async fn generate(&self, prompt: &str) -> Result<String, SynthesisError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "calling model");

        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!(status = status.as_u16(), "model API error");
            return Err(SynthesisError::Api {
                status: status.as_u16(),
                message: text.chars().take(400).collect(),
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| SynthesisError::Parse(format!("bad response envelope: {}", e)))?;

        let out: String = parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect();

        if out.is_empty() {
            return Err(SynthesisError::Empty);
        }
        Ok(out)
    }
}
