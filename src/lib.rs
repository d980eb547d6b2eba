//! Interview Coach
//!
//! A small web backend for interview practice: it serves questions by
//! category, asks a language model to score candidate answers, and keeps a
//! per-browser history of question/answer/feedback entries.
//!
//! # Architecture
//!
//! - **Server**: Axum HTTP server with cookie-identified sessions
//! - **Session Store**: In-memory, lazily-expiring history per session
//! - **Feedback**: Prompt construction on top of a pluggable LLM driver
//!
//! # Modules
//!
//! - [`api`]: Route handlers and the session cookie extractor
//! - [`catalog`]: Question catalog loaded at startup
//! - [`feedback`]: Answer evaluation
//! - [`llm`]: LLM driver trait and provider implementations
//! - [`session`]: Session and history management

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod feedback;
pub mod llm;
pub mod server;
pub mod session;

use std::sync::Arc;

use catalog::QuestionCatalog;
use config::WebConfig;
use feedback::FeedbackGenerator;
use session::SessionStore;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Question catalog, read-only after startup.
    pub catalog: Arc<QuestionCatalog>,
    /// Session store for practice history.
    pub sessions: Arc<dyn SessionStore>,
    /// Feedback generator for answer evaluation.
    pub feedback: Arc<dyn FeedbackGenerator>,
    /// Frontend locations.
    pub web: Arc<WebConfig>,
}
