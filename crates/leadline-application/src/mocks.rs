//! Hand-rolled fakes for the gateway and repository seams, shared by the
//! service tests in this crate.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use leadline_core::auth::{AuthGateway, AuthTokenSet, TokenRepository, UserInfo};
use leadline_core::conversation::lead::CollectedLead;
use leadline_core::error::Result;
use leadline_core::session::gateway::{LeadGateway, RemoteError, SessionGateway};
use leadline_core::session::model::{SessionPatch, SessionSnapshot};
use leadline_core::state::LocalStateRepository;
use leadline_core::theme::ThemeMode;

/// Scriptable in-memory session store.
///
/// Configured errors apply to every call of that operation (retry-exhaustion
/// tests); link failures are scripted per session id.
#[derive(Default)]
pub(crate) struct MockSessionGateway {
    create_error: Mutex<Option<RemoteError>>,
    create_calls: AtomicU32,
    update_error: Mutex<Option<RemoteError>>,
    update_calls: AtomicU32,
    updates: Mutex<Vec<(String, SessionPatch)>>,
    sessions: Mutex<HashMap<String, SessionSnapshot>>,
    user_sessions: Mutex<Vec<SessionSnapshot>>,
    deletes: Mutex<Vec<String>>,
    delete_error: Mutex<Option<RemoteError>>,
    renames: Mutex<Vec<(String, String)>>,
    rename_error: Mutex<Option<RemoteError>>,
    links: Mutex<Vec<(String, String)>>,
    link_errors: Mutex<HashMap<String, RemoteError>>,
}

impl MockSessionGateway {
    pub fn fail_creates_with(&self, err: RemoteError) {
        *self.create_error.lock().unwrap() = Some(err);
    }

    pub fn create_calls(&self) -> u32 {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn fail_updates_with(&self, err: RemoteError) {
        *self.update_error.lock().unwrap() = Some(err);
    }

    pub fn update_calls(&self) -> u32 {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn recorded_updates(&self) -> Vec<(String, SessionPatch)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn stash_session(&self, snapshot: SessionSnapshot) {
        self.sessions
            .lock()
            .unwrap()
            .insert(snapshot.id.clone(), snapshot);
    }

    pub fn stash_user_sessions(&self, snapshots: Vec<SessionSnapshot>) {
        *self.user_sessions.lock().unwrap() = snapshots;
    }

    pub fn recorded_deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn fail_deletes_with(&self, err: RemoteError) {
        *self.delete_error.lock().unwrap() = Some(err);
    }

    pub fn recorded_renames(&self) -> Vec<(String, String)> {
        self.renames.lock().unwrap().clone()
    }

    pub fn fail_renames_with(&self, err: RemoteError) {
        *self.rename_error.lock().unwrap() = Some(err);
    }

    pub fn recorded_links(&self) -> Vec<(String, String)> {
        self.links.lock().unwrap().clone()
    }

    pub fn fail_link_for(&self, session_id: &str, err: RemoteError) {
        self.link_errors
            .lock()
            .unwrap()
            .insert(session_id.to_string(), err);
    }
}

#[async_trait]
impl SessionGateway for MockSessionGateway {
    async fn create_session(&self, _user_id: Option<&str>) -> std::result::Result<String, RemoteError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.create_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(uuid::Uuid::new_v4().to_string())
    }

    async fn update_session(
        &self,
        session_id: &str,
        patch: &SessionPatch,
    ) -> std::result::Result<(), RemoteError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.update_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.updates
            .lock()
            .unwrap()
            .push((session_id.to_string(), patch.clone()));
        Ok(())
    }

    async fn load_session(
        &self,
        session_id: &str,
    ) -> std::result::Result<SessionSnapshot, RemoteError> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or(RemoteError::NotFound)
    }

    async fn delete_session(&self, session_id: &str) -> std::result::Result<(), RemoteError> {
        if let Some(err) = self.delete_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.deletes.lock().unwrap().push(session_id.to_string());
        self.sessions.lock().unwrap().remove(session_id);
        Ok(())
    }

    async fn rename_session(
        &self,
        session_id: &str,
        new_name: &str,
    ) -> std::result::Result<(), RemoteError> {
        if let Some(err) = self.rename_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.renames
            .lock()
            .unwrap()
            .push((session_id.to_string(), new_name.to_string()));
        Ok(())
    }

    async fn list_user_sessions(
        &self,
        _user_id: &str,
    ) -> std::result::Result<Vec<SessionSnapshot>, RemoteError> {
        Ok(self.user_sessions.lock().unwrap().clone())
    }

    async fn link_user(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> std::result::Result<(), RemoteError> {
        self.links
            .lock()
            .unwrap()
            .push((session_id.to_string(), user_id.to_string()));
        if let Some(err) = self.link_errors.lock().unwrap().get(session_id).cloned() {
            return Err(err);
        }
        Ok(())
    }
}

/// Scriptable lead intake.
#[derive(Default)]
pub(crate) struct MockLeadGateway {
    error: Mutex<Option<RemoteError>>,
    calls: AtomicU32,
    submissions: Mutex<Vec<(CollectedLead, String)>>,
}

impl MockLeadGateway {
    pub fn fail_with(&self, err: RemoteError) {
        *self.error.lock().unwrap() = Some(err);
    }

    pub fn submit_calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn recorded_submissions(&self) -> Vec<(CollectedLead, String)> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl LeadGateway for MockLeadGateway {
    async fn submit_lead(
        &self,
        lead: &CollectedLead,
        session_id: &str,
    ) -> std::result::Result<(), RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.error.lock().unwrap().clone() {
            return Err(err);
        }
        self.submissions
            .lock()
            .unwrap()
            .push((lead.clone(), session_id.to_string()));
        Ok(())
    }
}

/// In-memory stand-in for the file-backed local state store.
#[derive(Default)]
pub(crate) struct MemoryStateRepo {
    ids: Mutex<Vec<String>>,
    theme: Mutex<Option<ThemeMode>>,
    active: Mutex<Option<String>>,
}

#[async_trait]
impl LocalStateRepository for MemoryStateRepo {
    async fn anonymous_session_ids(&self) -> Vec<String> {
        self.ids.lock().unwrap().clone()
    }

    async fn add_anonymous_session(&self, session_id: &str) -> Result<()> {
        let mut ids = self.ids.lock().unwrap();
        if !ids.iter().any(|id| id == session_id) {
            ids.push(session_id.to_string());
        }
        Ok(())
    }

    async fn remove_anonymous_session(&self, session_id: &str) -> Result<()> {
        self.ids.lock().unwrap().retain(|id| id != session_id);
        Ok(())
    }

    async fn theme(&self) -> Option<ThemeMode> {
        *self.theme.lock().unwrap()
    }

    async fn set_theme(&self, mode: ThemeMode) -> Result<()> {
        *self.theme.lock().unwrap() = Some(mode);
        Ok(())
    }

    async fn active_session(&self) -> Option<String> {
        self.active.lock().unwrap().clone()
    }

    async fn set_active_session(&self, session_id: &str) -> Result<()> {
        *self.active.lock().unwrap() = Some(session_id.to_string());
        Ok(())
    }

    async fn clear_active_session(&self) -> Result<()> {
        *self.active.lock().unwrap() = None;
        Ok(())
    }
}

/// Scriptable identity provider: userinfo answers are consumed in order so a
/// 401-then-success sequence can be expressed.
#[derive(Default)]
pub(crate) struct MockAuthGateway {
    userinfo_results: Mutex<VecDeque<std::result::Result<UserInfo, RemoteError>>>,
    refresh_result: Mutex<Option<std::result::Result<AuthTokenSet, RemoteError>>>,
    refresh_calls: AtomicU32,
}

impl MockAuthGateway {
    pub fn push_userinfo(&self, result: std::result::Result<UserInfo, RemoteError>) {
        self.userinfo_results.lock().unwrap().push_back(result);
    }

    pub fn set_refresh(&self, result: std::result::Result<AuthTokenSet, RemoteError>) {
        *self.refresh_result.lock().unwrap() = Some(result);
    }

    pub fn refresh_calls(&self) -> u32 {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthGateway for MockAuthGateway {
    async fn userinfo(&self, _access_token: &str) -> std::result::Result<UserInfo, RemoteError> {
        self.userinfo_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(RemoteError::Unauthorized))
    }

    async fn refresh(
        &self,
        _refresh_token: &str,
    ) -> std::result::Result<AuthTokenSet, RemoteError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.refresh_result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Err(RemoteError::Unauthorized))
    }
}

/// In-memory token storage.
#[derive(Default)]
pub(crate) struct MockTokenRepo {
    tokens: Mutex<Option<AuthTokenSet>>,
}

impl MockTokenRepo {
    pub fn with_tokens(tokens: AuthTokenSet) -> Self {
        Self {
            tokens: Mutex::new(Some(tokens)),
        }
    }

    pub fn stored(&self) -> Option<AuthTokenSet> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenRepository for MockTokenRepo {
    async fn load(&self) -> Result<Option<AuthTokenSet>> {
        Ok(self.tokens.lock().unwrap().clone())
    }

    async fn save(&self, tokens: &AuthTokenSet) -> Result<()> {
        *self.tokens.lock().unwrap() = Some(tokens.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.tokens.lock().unwrap() = None;
        Ok(())
    }
}
