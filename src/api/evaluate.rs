use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::session::ActiveSession;
use crate::AppState;
use crate::error::ApiError;
use crate::feedback::FeedbackStyle;

#[derive(Debug, Deserialize)]
pub struct EvaluationRequest {
    pub answer: String,
    #[serde(default = "default_style")]
    pub style: String,
}

fn default_style() -> String {
    FeedbackStyle::Detailed.label().to_string()
}

#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    pub feedback: String,
}

/// POST /api/evaluate - Generate feedback for an answer.
///
/// No lock is held while the model call is in flight.
pub async fn evaluate_answer(
    State(state): State<AppState>,
    active: ActiveSession,
    body: Result<Json<EvaluationRequest>, JsonRejection>,
) -> (CookieJar, Result<Json<EvaluationResponse>, ApiError>) {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return (active.cookies, Err(rejection.into())),
    };

    let result: Result<_, ApiError> = match state.feedback.generate(&req.answer, &req.style).await {
        Ok(feedback) => Ok(Json(EvaluationResponse { feedback })),
        Err(e) => {
            warn!(
                name: "feedback.failed",
                session_id = %active.session.id(),
                error = %e,
                "Feedback generation failed"
            );
            Err(e.into())
        }
    };

    (active.cookies, result)
}
