//! Practice-session management.
//!
//! Each browser client owns one [`Session`], identified by an opaque UUID
//! carried in a cookie. A session holds the ordered history of answered
//! questions. Sessions expire a fixed time after creation; expiry is checked
//! lazily, each time a session is resolved.
//!
//! # Architecture
//!
//! - [`Session`]: A single client's history
//! - [`SessionStore`]: Storage abstraction used by the HTTP surface
//! - [`InMemorySessionStore`]: Process-local implementation
//!
//! # Example
//!
//! ```rust
//! use interview_coach::session::{HistoryEntry, InMemorySessionStore, SessionStore};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = InMemorySessionStore::default();
//! let session = store.resolve(None).await;
//! store
//!     .append(
//!         &session,
//!         HistoryEntry {
//!             category: "Behavioral".into(),
//!             question: "Tell me about a conflict.".into(),
//!             answer: "...".into(),
//!             feedback: "...".into(),
//!             feedback_style: "Concise".into(),
//!         },
//!     )
//!     .await
//!     .expect("session is live");
//!
//! assert_eq!(store.list(&session, None).await.unwrap().len(), 1);
//! # }
//! ```

mod history;
mod store;

pub use history::{ALL_CATEGORIES, HistoryEntry, Session};
pub use store::{
    Clock, DEFAULT_SESSION_TIMEOUT, InMemorySessionStore, ManualClock, SessionStore, StoreError,
    SystemClock, generate_session_id, is_expired,
};
