use crate::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL, LlmSettings, Provider};
use anyhow::{Context, bail};
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Session lifetime in seconds
    #[arg(long, env = "SESSION_TIMEOUT_SECS")]
    pub session_timeout: Option<u64>,

    /// Path to the question catalog JSON file
    #[arg(long, env = "QUESTIONS_FILE")]
    pub questions: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub catalog: CatalogConfig,
    pub web: WebConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Seconds a session lives after creation. Zero expires sessions immediately.
    pub timeout_secs: u64,
}

impl SessionConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    /// Directory served under `/static`.
    pub static_dir: String,
    /// Document returned for unmatched non-API paths.
    pub index_file: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    /// Priority: CLI flag > CLI env var > `COACH_` env var > config file > defaults.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.port", 8000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("session.timeout_secs", 3600)?
            .set_default("catalog.path", "questions.json")?
            .set_default("web.static_dir", "frontend")?
            .set_default("web.index_file", "frontend/index.html")?;

        // Explicit file must exist; ./config.{yaml,toml,json} is optional.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // E.g. COACH_SERVER__PORT=9000
        builder = builder.add_source(
            Environment::with_prefix("COACH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(timeout) = cli.session_timeout {
            builder = builder.set_override("session.timeout_secs", timeout)?;
        }
        if let Some(questions) = cli.questions {
            builder = builder.set_override("catalog.path", questions)?;
        }

        builder.build()?.try_deserialize()
    }
}

/// Load LLM settings from the process environment.
pub fn load_llm_settings() -> anyhow::Result<LlmSettings> {
    llm_settings_from(|key| std::env::var(key).ok())
}

/// Build LLM settings from a variable lookup.
///
/// `LLM_API_KEY` (or `GEMINI_API_KEY`) is required. `LLM_PROVIDER` overrides
/// detection from `LLM_BASE_URL`.
pub fn llm_settings_from<F>(lookup: F) -> anyhow::Result<LlmSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let base_url = var("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let model = var("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let Some(api_key) = var("LLM_API_KEY").or_else(|| var("GEMINI_API_KEY")) else {
        bail!("Missing required env var: LLM_API_KEY (or GEMINI_API_KEY)");
    };

    let provider = match var("LLM_PROVIDER") {
        Some(label) => Provider::from_label(&label)
            .with_context(|| format!("Unknown LLM_PROVIDER: {label}"))?,
        None => Provider::detect_from_url(&base_url),
    };

    Ok(LlmSettings {
        base_url,
        api_key,
        model,
        provider,
    })
}
