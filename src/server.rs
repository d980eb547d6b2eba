use anyhow::Context;
use axum::{Router, extract::DefaultBodyLimit};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::api;
use crate::catalog::QuestionCatalog;
use crate::config::AppConfig;
use crate::feedback::LlmFeedbackGenerator;
use crate::llm::{LlmSettings, build_driver};
use crate::session::{InMemorySessionStore, SessionStore};

/// Request bodies are small JSON documents.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>, settings: LlmSettings) -> anyhow::Result<()> {
    info!(
        name: "llm.config.loaded",
        base_url = %settings.base_url,
        model = %settings.model,
        provider = ?settings.provider,
        "LLM configuration loaded"
    );

    let catalog = QuestionCatalog::load(&config.catalog.path)
        .with_context(|| format!("Failed to load question catalog {}", config.catalog.path))?;

    let sessions: Arc<dyn SessionStore> =
        Arc::new(InMemorySessionStore::new(config.session.timeout()));

    let feedback = Arc::new(LlmFeedbackGenerator::new(build_driver(settings)));

    let state = AppState {
        catalog: Arc::new(catalog),
        sessions,
        feedback,
        web: Arc::new(config.web.clone()),
    };

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(
        name: "server.started",
        address = %addr,
        session_timeout_secs = config.session.timeout_secs,
        "Server started"
    );

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Build the full application router: API, static assets, and middleware.
pub fn build_router(state: AppState) -> Router {
    // Cookies need credentials, which rules out wildcard CORS.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    api::router()
        .nest_service("/static", ServeDir::new(&state.web.static_dir))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!(name: "server.stopping", "Shutdown signal received");
}
