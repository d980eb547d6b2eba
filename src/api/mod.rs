//! HTTP API.
//!
//! Every stateful route takes an [`ActiveSession`](session::ActiveSession)
//! and returns its refreshed cookie jar alongside the response.

pub mod evaluate;
pub mod history;
pub mod questions;
pub mod session;

use axum::{
    Router,
    extract::State,
    http::{Method, Uri},
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
};
use tracing::warn;

use crate::AppState;
use crate::error::ApiError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(questions::list_categories))
        .route("/api/question/{category}", get(questions::random_question))
        .route("/api/evaluate", post(evaluate::evaluate_answer))
        .route(
            "/api/history",
            get(history::list_entries)
                .post(history::add_entry)
                .delete(history::clear_entries),
        )
        .route("/api/history/batch", delete(history::delete_entries))
        .route("/api/history/{index}", delete(history::delete_entry))
        .fallback(spa_fallback)
}

/// Serve the index document for client-side routes; unknown API paths are 404.
async fn spa_fallback(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if uri.path().trim_start_matches('/').starts_with("api/")
        || !(method == Method::GET || method == Method::HEAD)
    {
        return ApiError::NotFound("Not Found".to_string()).into_response();
    }

    match tokio::fs::read_to_string(&state.web.index_file).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            warn!(
                name: "web.index_missing",
                path = %state.web.index_file,
                error = %e,
                "Index document unavailable"
            );
            ApiError::NotFound("Not Found".to_string()).into_response()
        }
    }
}
