//! Practice sessions and their history entries.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StoreError;

/// Category filter value that matches every history entry.
pub const ALL_CATEGORIES: &str = "All";

/// One recorded question/answer/feedback interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Question category, e.g. `Behavioral`.
    pub category: String,
    /// The question that was asked.
    pub question: String,
    /// The candidate's answer.
    pub answer: String,
    /// Feedback produced for the answer.
    pub feedback: String,
    /// Style label the feedback was generated with.
    pub feedback_style: String,
}

/// A single client's practice session.
///
/// Cloning is cheap: clones share the same history, so a handle obtained
/// from a store observes every mutation made through any other handle.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    id: String,
    created_at: DateTime<Utc>,
    history: Mutex<Vec<HistoryEntry>>,
}

impl Session {
    /// Create an empty session.
    #[must_use]
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                id: id.into(),
                created_at,
                history: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Get the session ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Get the session creation time.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }

    /// Whether both handles refer to the same stored session.
    #[must_use]
    pub fn same_as(&self, other: &Session) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of history entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.history().len()
    }

    /// Check if the history is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append an entry to the end of the history.
    pub fn push(&self, entry: HistoryEntry) {
        self.history().push(entry);
    }

    /// Snapshot of the history, optionally filtered by category.
    ///
    /// `None` and [`ALL_CATEGORIES`] both return everything.
    #[must_use]
    pub fn entries(&self, category: Option<&str>) -> Vec<HistoryEntry> {
        let history = self.history();
        match category {
            None | Some(ALL_CATEGORIES) => history.clone(),
            Some(category) => history
                .iter()
                .filter(|entry| entry.category == category)
                .cloned()
                .collect(),
        }
    }

    /// Remove the entry at `index`.
    pub fn remove(&self, index: i64) -> Result<HistoryEntry, StoreError> {
        let mut history = self.history();
        let position = position(index, history.len()).ok_or(StoreError::NotFound { index })?;
        Ok(history.remove(position))
    }

    /// Remove every entry named in `indices`, or none of them.
    ///
    /// All indices are checked against the current length before anything
    /// is removed. Removal runs from the highest position down so earlier
    /// removals never shift a pending target.
    pub fn remove_many(&self, indices: &[i64]) -> Result<usize, StoreError> {
        let mut history = self.history();
        let len = history.len();

        if let Some(&index) = indices.iter().find(|&&i| position(i, len).is_none()) {
            return Err(StoreError::InvalidArgument { index });
        }

        let targets: BTreeSet<usize> = indices
            .iter()
            .filter_map(|&i| position(i, len))
            .collect();
        for &target in targets.iter().rev() {
            history.remove(target);
        }
        Ok(targets.len())
    }

    /// Drop every history entry.
    pub fn clear(&self) {
        self.history().clear();
    }

    fn history(&self) -> MutexGuard<'_, Vec<HistoryEntry>> {
        self.inner
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Map a client-supplied index onto a valid position in `[0, len)`.
fn position(index: i64, len: usize) -> Option<usize> {
    usize::try_from(index).ok().filter(|&p| p < len)
}
