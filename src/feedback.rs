//! Answer evaluation.
//!
//! Builds the coaching prompt for a candidate's answer and hands it to an
//! [`LlmDriver`]. The model's text is returned verbatim as feedback.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::llm::{LlmDriver, LlmError};

/// Tone and depth of the generated feedback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedbackStyle {
    /// Thorough analysis.
    #[default]
    Detailed,
    /// Short evaluation.
    Concise,
    /// Encouraging tone.
    Friendly,
}

impl FeedbackStyle {
    /// Parse a style label. Unknown labels fall back to [`FeedbackStyle::Detailed`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "Concise" => Self::Concise,
            "Friendly" => Self::Friendly,
            _ => Self::Detailed,
        }
    }

    /// The label clients send and store with history entries.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Detailed => "Detailed",
            Self::Concise => "Concise",
            Self::Friendly => "Friendly",
        }
    }

    /// Instruction sentence embedded in the prompt.
    #[must_use]
    pub fn instruction(self) -> &'static str {
        match self {
            Self::Detailed => "Provide a thorough and detailed analysis.",
            Self::Concise => "Give a brief and concise evaluation.",
            Self::Friendly => "Offer feedback in a friendly and encouraging tone.",
        }
    }
}

/// Build the evaluation prompt for `answer`.
#[must_use]
pub fn build_prompt(answer: &str, style: FeedbackStyle) -> String {
    format!(
        r#"
You are an expert interview coach.

Here is a candidate's answer to a behavioral interview question:
"{answer}"

Evaluate the response on:
- Clarity (1-5)
- STAR format use (1-5)
- Impactfulness (1-5)

{instruction}

Then provide short, actionable feedback on how to improve.
"#,
        instruction = style.instruction()
    )
}

/// Errors produced while generating feedback.
#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    /// The answer was empty or only whitespace.
    #[error("Answer cannot be empty")]
    EmptyAnswer,

    /// The language model call failed.
    #[error(transparent)]
    Upstream(#[from] LlmError),
}

/// Produces feedback for a candidate's answer.
#[async_trait]
pub trait FeedbackGenerator: Send + Sync + std::fmt::Debug {
    /// Evaluate `answer` in the style named by `style`.
    async fn generate(&self, answer: &str, style: &str) -> Result<String, FeedbackError>;
}

/// [`FeedbackGenerator`] backed by a language model.
#[derive(Debug, Clone)]
pub struct LlmFeedbackGenerator {
    driver: Arc<dyn LlmDriver>,
}

impl LlmFeedbackGenerator {
    #[must_use]
    pub fn new(driver: Arc<dyn LlmDriver>) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl FeedbackGenerator for LlmFeedbackGenerator {
    async fn generate(&self, answer: &str, style: &str) -> Result<String, FeedbackError> {
        if answer.trim().is_empty() {
            return Err(FeedbackError::EmptyAnswer);
        }

        let style = FeedbackStyle::from_label(style);
        let prompt = build_prompt(answer, style);
        let feedback = self.driver.complete(&prompt).await?;

        info!(
            name: "feedback.generated",
            style = style.label(),
            answer_chars = answer.chars().count(),
            feedback_chars = feedback.chars().count(),
            "Feedback generated"
        );
        Ok(feedback)
    }
}
