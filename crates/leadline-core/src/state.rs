//! Client-side persistent state contract.
//!
//! Covers the small bits of state the client keeps across runs: the
//! anonymous session id list (so pre-login conversations can be revisited
//! and later linked to an account), the theme preference, and the active
//! session reference.

use async_trait::async_trait;

use crate::error::Result;
use crate::theme::ThemeMode;

/// Repository for locally persisted client state.
#[async_trait]
pub trait LocalStateRepository: Send + Sync {
    /// All remembered anonymous session ids, oldest first.
    async fn anonymous_session_ids(&self) -> Vec<String>;

    /// Remembers a session created while unauthenticated.
    async fn add_anonymous_session(&self, session_id: &str) -> Result<()>;

    /// Forgets an anonymous session id (deleted, or linked to an account).
    async fn remove_anonymous_session(&self, session_id: &str) -> Result<()>;

    /// The persisted theme preference, if the user ever chose one.
    async fn theme(&self) -> Option<ThemeMode>;

    /// Persists the theme preference.
    async fn set_theme(&self, mode: ThemeMode) -> Result<()>;

    /// The session the user last had open.
    async fn active_session(&self) -> Option<String>;

    /// Records the session the user has open.
    async fn set_active_session(&self, session_id: &str) -> Result<()>;

    /// Clears the active session reference.
    async fn clear_active_session(&self) -> Result<()>;
}
