//! `OpenAI` Chat Completions API driver.
//!
//! Sends the prompt as a single user message to `/v1/chat/completions` and
//! returns the first choice's content. Streaming is not used.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{LlmDriver, LlmError, LlmSettings, send_json};

/// Driver for the `OpenAI` Chat Completions API.
#[derive(Clone)]
pub struct ChatCompletionsDriver {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl std::fmt::Debug for ChatCompletionsDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsDriver")
            .field("settings", &self.settings)
            .finish()
    }
}

impl ChatCompletionsDriver {
    /// Create a new Chat Completions driver with the given settings.
    #[must_use]
    pub fn new(settings: LlmSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }
}

#[async_trait]
impl LlmDriver for ChatCompletionsDriver {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let url = self
            .settings
            .provider
            .build_url(&self.settings.base_url, &self.settings.model);

        let body = json!({
            "model": self.settings.model,
            "stream": false,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let request = self
            .http
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .json(&body);

        let value = send_json(request).await?;
        extract_text(&value).ok_or(LlmError::EmptyResponse)
    }
}

/// Pull the assistant text out of a Chat Completions response.
fn extract_text(value: &Value) -> Option<String> {
    value["choices"][0]["message"]["content"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text() {
        let value = json!({
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": "Clarity: 4/5" } }]
        });
        assert_eq!(extract_text(&value).as_deref(), Some("Clarity: 4/5"));
    }

    #[test]
    fn test_extract_text_missing() {
        assert_eq!(extract_text(&json!({ "choices": [] })), None);
        assert_eq!(
            extract_text(&json!({ "choices": [{ "message": { "content": "" } }] })),
            None
        );
    }
}
