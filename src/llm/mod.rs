//! LLM driver traits and implementations.
//!
//! This module provides a small, provider-agnostic abstraction for sending a
//! single prompt to a hosted language model and reading back its text.
//!
//! # Drivers
//!
//! - [`GeminiDriver`]: Google Generative Language API (`generateContent`)
//! - [`ChatCompletionsDriver`]: `OpenAI` Chat Completions API (`/v1/chat/completions`)
//!
//! # Example
//!
//! ```rust,ignore
//! use interview_coach::llm::{LlmSettings, Provider, build_driver};
//!
//! let settings = LlmSettings {
//!     base_url: "https://generativelanguage.googleapis.com".to_string(),
//!     api_key: "AIza...".to_string(),
//!     model: "gemini-2.0-flash".to_string(),
//!     provider: Provider::Gemini,
//! };
//! let driver = build_driver(settings);
//! let text = driver.complete("Say hello").await?;
//! ```

pub mod chat_completions;
pub mod gemini;
pub mod provider;

pub use chat_completions::ChatCompletionsDriver;
pub use gemini::GeminiDriver;
pub use provider::Provider;

use std::sync::Arc;

use async_trait::async_trait;

/// Default API base URL (Google Generative Language API).
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// LLM connection and model settings.
#[derive(Clone)]
pub struct LlmSettings {
    /// Base URL for the LLM API.
    pub base_url: String,
    /// API key for authentication.
    pub api_key: String,
    /// Model identifier (e.g., `gemini-2.0-flash`, `gpt-4o-mini`).
    pub model: String,
    /// Provider type (auto-detected from `base_url` if not specified).
    pub provider: Provider,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("provider", &self.provider)
            .finish()
    }
}

/// Errors returned by LLM drivers.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The request could not be sent or the body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned by the API.
        message: String,
    },

    /// The API answered successfully but produced no text.
    #[error("Model returned no text")]
    EmptyResponse,
}

/// A language model that turns one prompt into one block of text.
#[async_trait]
pub trait LlmDriver: Send + Sync + std::fmt::Debug {
    /// Send `prompt` and return the model's text output.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Build the driver matching `settings.provider`.
#[must_use]
pub fn build_driver(settings: LlmSettings) -> Arc<dyn LlmDriver> {
    match settings.provider {
        Provider::Gemini => Arc::new(GeminiDriver::new(settings)),
        Provider::OpenAiCompatible => Arc::new(ChatCompletionsDriver::new(settings)),
    }
}

/// Send a JSON request and decode a JSON response, mapping error statuses.
pub(crate) async fn send_json(
    request: reqwest::RequestBuilder,
) -> Result<serde_json::Value, LlmError> {
    let resp = request.send().await?;
    let status = resp.status();
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(LlmError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(resp.json().await?)
}
