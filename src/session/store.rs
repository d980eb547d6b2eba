//! Session storage with lazy expiry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use super::history::{HistoryEntry, Session};

/// Default session timeout (1 hour).
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Errors raised when addressing history entries by position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A single index was outside the history bounds.
    #[error("History entry {index} not found")]
    NotFound {
        /// The rejected index.
        index: i64,
    },

    /// An index within a batch was outside the history bounds.
    #[error("Invalid index: {index}")]
    InvalidArgument {
        /// The first rejected index.
        index: i64,
    },

    /// The session was swept after it was resolved.
    #[error("Session {id} has expired")]
    Expired {
        /// Identifier of the swept session.
        id: String,
    },
}

/// Generate a fresh, unguessable session identifier.
#[must_use]
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Check whether a session created at `created_at` has outlived `timeout`.
///
/// A creation time in the future (clock skew) never counts as expired.
#[must_use]
pub fn is_expired(created_at: DateTime<Utc>, now: DateTime<Utc>, timeout: Duration) -> bool {
    (now - created_at)
        .to_std()
        .is_ok_and(|age| age > timeout)
}

/// Source of the current time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Lets tests and tools drive expiry deterministically. Share it with the
/// store through an `Arc` and call [`ManualClock::advance`].
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock stopped at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += chrono::Duration::from_std(by).unwrap_or(chrono::Duration::MAX);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Per-client session storage.
///
/// The HTTP surface only sees this trait, so the in-memory map can be
/// replaced by another backing without touching any handler.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Return the live session named by `id`, or create a new empty one.
    ///
    /// Expired sessions are swept first. Never fails.
    async fn resolve(&self, id: Option<&str>) -> Session;

    /// Append an entry to the session history.
    ///
    /// Like every per-session operation below, fails with
    /// [`StoreError::Expired`] if `session` was swept after it was resolved.
    async fn append(&self, session: &Session, entry: HistoryEntry) -> Result<(), StoreError>;

    /// List history, optionally filtered by category.
    async fn list(
        &self,
        session: &Session,
        category: Option<&str>,
    ) -> Result<Vec<HistoryEntry>, StoreError>;

    /// Remove a single entry by position.
    async fn delete_at(&self, session: &Session, index: i64) -> Result<HistoryEntry, StoreError>;

    /// Remove several entries by position, all or nothing.
    async fn delete_batch(&self, session: &Session, indices: &[i64]) -> Result<usize, StoreError>;

    /// Empty the session history.
    async fn clear(&self, session: &Session) -> Result<(), StoreError>;

    /// Remove every session older than the timeout. Returns the count removed.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> usize;

    /// Configured session lifetime.
    fn timeout(&self) -> Duration;
}

/// Thread-safe in-process session store.
#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    sessions: RwLock<HashMap<String, Session>>,
    timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TIMEOUT)
    }
}

impl InMemorySessionStore {
    /// Create a store using the system clock.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self::with_clock(timeout, Arc::new(SystemClock))
    }

    /// Create a store that reads time from `clock`.
    #[must_use]
    pub fn with_clock(timeout: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                sessions: RwLock::new(HashMap::new()),
                timeout,
                clock,
            }),
        }
    }

    /// Get the number of stored sessions, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if there are no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sessions_mut(&self) -> RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.inner
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `op` on `session` while it is still the stored one.
    ///
    /// Holds the map's read lock for the duration, so a sweep cannot remove
    /// the session in the middle of the operation.
    fn with_live<R>(
        &self,
        session: &Session,
        op: impl FnOnce(&Session) -> R,
    ) -> Result<R, StoreError> {
        let sessions = self
            .inner
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match sessions.get(session.id()) {
            Some(stored) if stored.same_as(session) => Ok(op(stored)),
            _ => Err(StoreError::Expired {
                id: session.id().to_string(),
            }),
        }
    }

    fn sweep_locked(&self, sessions: &mut HashMap<String, Session>, now: DateTime<Utc>) -> usize {
        let before = sessions.len();
        sessions.retain(|_, session| !is_expired(session.created_at(), now, self.inner.timeout));
        let removed = before - sessions.len();
        if removed > 0 {
            debug!(name: "session.swept", removed, remaining = sessions.len(), "Expired sessions removed");
        }
        removed
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn resolve(&self, id: Option<&str>) -> Session {
        let now = self.inner.clock.now();
        let mut sessions = self.sessions_mut();
        self.sweep_locked(&mut sessions, now);

        if let Some(session) = id.and_then(|id| sessions.get(id)) {
            return session.clone();
        }

        let session = Session::new(generate_session_id(), now);
        sessions.insert(session.id().to_string(), session.clone());
        debug!(name: "session.created", session_id = %session.id(), "Session created");
        session
    }

    async fn append(&self, session: &Session, entry: HistoryEntry) -> Result<(), StoreError> {
        self.with_live(session, |s| s.push(entry))
    }

    async fn list(
        &self,
        session: &Session,
        category: Option<&str>,
    ) -> Result<Vec<HistoryEntry>, StoreError> {
        self.with_live(session, |s| s.entries(category))
    }

    async fn delete_at(&self, session: &Session, index: i64) -> Result<HistoryEntry, StoreError> {
        self.with_live(session, |s| s.remove(index))?
    }

    async fn delete_batch(&self, session: &Session, indices: &[i64]) -> Result<usize, StoreError> {
        self.with_live(session, |s| s.remove_many(indices))?
    }

    async fn clear(&self, session: &Session) -> Result<(), StoreError> {
        self.with_live(session, Session::clear)
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions_mut();
        self.sweep_locked(&mut sessions, now)
    }

    fn timeout(&self) -> Duration {
        self.inner.timeout
    }
}
