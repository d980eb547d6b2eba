use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::session::ActiveSession;
use crate::AppState;
use crate::error::ApiError;
use crate::session::HistoryEntry;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
pub struct BatchDeleteRequest {
    pub indices: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    fn success() -> Json<Self> {
        Json(Self { status: "success" })
    }
}

type StatusResult = Result<Json<StatusResponse>, ApiError>;

/// POST /api/history - Record an answered question.
pub async fn add_entry(
    State(state): State<AppState>,
    mut active: ActiveSession,
    body: Result<Json<HistoryEntry>, JsonRejection>,
) -> (CookieJar, StatusResult) {
    let result = match body {
        Ok(Json(entry)) => {
            let mut appended = state.sessions.append(&active.session, entry.clone()).await;
            if active.renew_if_expired(&state, &appended).await {
                appended = state.sessions.append(&active.session, entry).await;
            }
            appended
                .map(|()| StatusResponse::success())
                .map_err(ApiError::from)
        }
        Err(rejection) => Err(rejection.into()),
    };
    (active.cookies, result)
}

/// GET /api/history?category= - List history, optionally by category.
pub async fn list_entries(
    State(state): State<AppState>,
    mut active: ActiveSession,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> (CookieJar, Result<Json<HistoryResponse>, ApiError>) {
    let result = match query {
        Ok(Query(query)) => {
            let category = query.category.as_deref().filter(|c| !c.is_empty());
            let mut listed = state.sessions.list(&active.session, category).await;
            if active.renew_if_expired(&state, &listed).await {
                listed = state.sessions.list(&active.session, category).await;
            }
            listed
                .map(|history| Json(HistoryResponse { history }))
                .map_err(ApiError::from)
        }
        Err(rejection) => Err(rejection.into()),
    };
    (active.cookies, result)
}

/// DELETE /api/history - Clear all history.
pub async fn clear_entries(
    State(state): State<AppState>,
    mut active: ActiveSession,
) -> (CookieJar, StatusResult) {
    let mut cleared = state.sessions.clear(&active.session).await;
    if active.renew_if_expired(&state, &cleared).await {
        cleared = state.sessions.clear(&active.session).await;
    }
    let result = cleared.map_err(ApiError::from).map(|()| {
        info!(name: "history.cleared", session_id = %active.session.id(), "History cleared");
        StatusResponse::success()
    });
    (active.cookies, result)
}

/// DELETE /api/history/{index} - Remove one entry.
pub async fn delete_entry(
    State(state): State<AppState>,
    mut active: ActiveSession,
    index: Result<Path<i64>, PathRejection>,
) -> (CookieJar, StatusResult) {
    let result = match index {
        Ok(Path(index)) => {
            let mut removed = state.sessions.delete_at(&active.session, index).await;
            if active.renew_if_expired(&state, &removed).await {
                removed = state.sessions.delete_at(&active.session, index).await;
            }
            removed
                .map(|_| StatusResponse::success())
                .map_err(ApiError::from)
        }
        Err(rejection) => Err(rejection.into()),
    };
    (active.cookies, result)
}

/// DELETE /api/history/batch - Remove several entries, all or nothing.
pub async fn delete_entries(
    State(state): State<AppState>,
    mut active: ActiveSession,
    body: Result<Json<BatchDeleteRequest>, JsonRejection>,
) -> (CookieJar, StatusResult) {
    let result = match body {
        Ok(Json(req)) => {
            let mut deleted = state.sessions.delete_batch(&active.session, &req.indices).await;
            if active.renew_if_expired(&state, &deleted).await {
                deleted = state.sessions.delete_batch(&active.session, &req.indices).await;
            }
            deleted.map_err(ApiError::from).map(|removed| {
                info!(
                    name: "history.batch_deleted",
                    session_id = %active.session.id(),
                    removed,
                    "History entries deleted"
                );
                StatusResponse::success()
            })
        }
        Err(rejection) => Err(rejection.into()),
    };
    (active.cookies, result)
}
