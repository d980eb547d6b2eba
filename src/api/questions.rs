use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use tracing::debug;

use super::session::ActiveSession;
use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub question: String,
    pub category: String,
}

/// GET /api/categories - List question categories.
pub async fn list_categories(State(state): State<AppState>) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: state.catalog.category_names(),
    })
}

/// GET /api/question/{category} - Pick a random question.
///
/// The category is checked before the session is resolved, so an unknown
/// category never creates a session.
pub async fn random_question(
    State(state): State<AppState>,
    jar: CookieJar,
    category: Result<Path<String>, PathRejection>,
) -> Result<(CookieJar, Json<QuestionResponse>), ApiError> {
    let Path(category) = category?;
    let question = state
        .catalog
        .random_question(&category)
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?
        .to_string();

    let active = ActiveSession::resolve(jar, &state).await;
    debug!(
        name: "question.served",
        session_id = %active.session.id(),
        category = %category,
        "Question served"
    );

    Ok((active.cookies, Json(QuestionResponse { question, category })))
}
