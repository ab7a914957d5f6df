//! Client for the Gemini `generateContent` endpoint.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::AssistantError;
use crate::models::config::AssistantConfig;

/// Reply used when the service returns no usable text.
pub const FALLBACK_REPLY: &str = "I could not generate a response right now.";

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    /// Build a client from configuration. Fails without an API key.
    pub fn from_config(config: &AssistantConfig) -> Result<Self, AssistantError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(AssistantError::MissingApiKey)?;
        Ok(Self::new(api_key, config.model.clone()).with_base_url(config.base_url.clone()))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            self.model,
            self.api_key
        )
    }

    /// Send one user prompt and return the joined candidate text.
    pub async fn generate(&self, prompt: &str) -> Result<String, AssistantError> {
        let body = json!({
            "contents": [
                { "role": "user", "parts": [{ "text": prompt }] }
            ]
        });

        debug!("Sending {} character prompt to {}", prompt.len(), self.model);
        let res = self.client.post(self.endpoint()).json(&body).send().await?;

        let status = res.status();
        if !status.is_success() {
            let error_text = res.text().await.unwrap_or_default();
            warn!("Generation request failed with status {}", status);
            return Err(AssistantError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let response: GenerateResponse = res.json().await?;
        Ok(join_candidates(&response))
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn join_candidates(response: &GenerateResponse) -> String {
    let text = response
        .candidates
        .iter()
        .filter_map(|candidate| candidate.content.as_ref())
        .flat_map(|content| content.parts.iter())
        .filter_map(|part| part.text.as_deref())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    if text.is_empty() {
        FALLBACK_REPLY.to_string()
    } else {
        text
    }
}
