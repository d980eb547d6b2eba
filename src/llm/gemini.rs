//! Google Generative Language API driver.
//!
//! Calls `v1beta/models/{model}:generateContent` with the API key in the
//! `x-goog-api-key` header.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{LlmDriver, LlmError, LlmSettings, send_json};

/// Driver for Gemini models.
#[derive(Clone)]
pub struct GeminiDriver {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl std::fmt::Debug for GeminiDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiDriver")
            .field("settings", &self.settings)
            .finish()
    }
}

impl GeminiDriver {
    /// Create a new Gemini driver with the given settings.
    #[must_use]
    pub fn new(settings: LlmSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }
}

#[async_trait]
impl LlmDriver for GeminiDriver {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let url = self
            .settings
            .provider
            .build_url(&self.settings.base_url, &self.settings.model);

        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
        });

        let request = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.settings.api_key)
            .json(&body);

        let value = send_json(request).await?;
        extract_text(&value).ok_or(LlmError::EmptyResponse)
    }
}

/// Concatenate the text parts of the first candidate.
///
/// Blocked prompts come back without candidates and yield `None`.
fn extract_text(value: &Value) -> Option<String> {
    let parts = value["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();
    (!text.is_empty()).then_some(text)
}
