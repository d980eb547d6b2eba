//! Provider-specific configuration and detection.
//!
//! This module handles differences between LLM API providers, mainly URL
//! patterns and authentication.

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Google Generative Language API (Gemini models).
    Gemini,
    /// Any `OpenAI`-compatible Chat Completions endpoint.
    OpenAiCompatible,
}

impl Provider {
    /// Detect provider from base URL.
    ///
    /// # Example
    ///
    /// ```rust
    /// use interview_coach::llm::Provider;
    ///
    /// let provider = Provider::detect_from_url("https://generativelanguage.googleapis.com");
    /// assert_eq!(provider, Provider::Gemini);
    /// ```
    #[must_use]
    pub fn detect_from_url(base_url: &str) -> Self {
        let lower = base_url.to_lowercase();

        if lower.contains("generativelanguage.googleapis.com") {
            Self::Gemini
        } else {
            Self::OpenAiCompatible
        }
    }

    /// Parse an explicit provider label (`gemini`, `openai`).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "gemini" | "google" => Some(Self::Gemini),
            "openai" | "chat" | "openai-compatible" => Some(Self::OpenAiCompatible),
            _ => None,
        }
    }

    /// Build the completion URL for this provider.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL (trailing slash optional)
    /// * `model` - The model name (part of the path for Gemini only)
    #[must_use]
    pub fn build_url(self, base_url: &str, model: &str) -> String {
        let base = base_url.trim_end_matches('/');

        match self {
            Self::Gemini => format!("{base}/v1beta/models/{model}:generateContent"),
            Self::OpenAiCompatible => format!("{base}/v1/chat/completions"),
        }
    }
}
