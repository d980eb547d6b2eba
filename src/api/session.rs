//! Cookie-based session identification.

use std::convert::Infallible;
use std::time::Duration;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::debug;

use crate::AppState;
use crate::session::{Session, StoreError};

/// Name of the cookie carrying the session identifier.
pub const SESSION_COOKIE: &str = "session_id";

/// The session resolved for the current request.
///
/// `cookies` already carries a refreshed `session_id` cookie; return it with
/// the response, success or error, so the client keeps the identifier.
#[derive(Debug)]
pub struct ActiveSession {
    pub session: Session,
    pub cookies: CookieJar,
}

impl ActiveSession {
    /// Resolve the session named by the request cookies, creating one if needed.
    pub async fn resolve(jar: CookieJar, state: &AppState) -> Self {
        let requested = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
        let session = state.sessions.resolve(requested.as_deref()).await;
        let cookies = jar.add(session_cookie(session.id(), state.sessions.timeout()));
        Self { session, cookies }
    }

    /// Switch to a fresh session if `result` reports that the current one
    /// was swept after it was resolved.
    ///
    /// Returns `true` when the caller should repeat the operation against
    /// the new session. The cookie jar is updated to match.
    pub async fn renew_if_expired<T>(
        &mut self,
        state: &AppState,
        result: &Result<T, StoreError>,
    ) -> bool {
        if !matches!(result, Err(StoreError::Expired { .. })) {
            return false;
        }

        let expired = self.session.id().to_string();
        self.session = state.sessions.resolve(None).await;
        self.cookies = self
            .cookies
            .clone()
            .add(session_cookie(self.session.id(), state.sessions.timeout()));
        debug!(
            name: "session.renewed",
            expired = %expired,
            session_id = %self.session.id(),
            "Session expired mid-request"
        );
        true
    }
}

impl FromRequestParts<AppState> for ActiveSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(Self::resolve(jar, state).await)
    }
}

/// Build the `session_id` cookie, living as long as the session itself.
#[must_use]
pub fn session_cookie(id: &str, timeout: Duration) -> Cookie<'static> {
    let max_age = i64::try_from(timeout.as_secs()).unwrap_or(i64::MAX);
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age))
        .build()
}
