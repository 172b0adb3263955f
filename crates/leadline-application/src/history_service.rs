//! The conversation history list.
//!
//! Authenticated users get their server-side list in one call; anonymous
//! users only have the locally remembered ids, loaded one by one with
//! failures silently dropped. The server's recency order is kept as-is.

use std::sync::Arc;

use thiserror::Error;

use leadline_core::event::{SessionSignal, SignalBus};
use leadline_core::session::gateway::{RemoteError, SessionGateway};
use leadline_core::session::model::SessionSummary;
use leadline_core::state::LocalStateRepository;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Please enter a name.")]
    EmptyName,
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Listing, renaming, and deleting stored conversations.
pub struct HistoryService {
    sessions: Arc<dyn SessionGateway>,
    local: Arc<dyn LocalStateRepository>,
    bus: SignalBus,
}

impl HistoryService {
    pub fn new(
        sessions: Arc<dyn SessionGateway>,
        local: Arc<dyn LocalStateRepository>,
        bus: SignalBus,
    ) -> Self {
        Self {
            sessions,
            local,
            bus,
        }
    }

    /// Lists sessions for the history view, newest first (server order).
    ///
    /// Anonymous listing loads each remembered id individually; ids that
    /// fail to load are skipped without surfacing an error.
    pub async fn list_sessions(
        &self,
        user_id: Option<&str>,
    ) -> Result<Vec<SessionSummary>, RemoteError> {
        match user_id {
            Some(user_id) => {
                let sessions = self.sessions.list_user_sessions(user_id).await?;
                Ok(sessions.iter().map(|s| s.summarize()).collect())
            }
            None => {
                let mut summaries = Vec::new();
                for session_id in self.local.anonymous_session_ids().await {
                    match self.sessions.load_session(&session_id).await {
                        Ok(snapshot) => summaries.push(snapshot.summarize()),
                        Err(e) => {
                            tracing::debug!(
                                "[History] Skipping session {}: {}",
                                session_id,
                                e
                            );
                        }
                    }
                }
                Ok(summaries)
            }
        }
    }

    /// Renames a session. The caller refreshes its view only after this
    /// returns Ok: the new name must be server-confirmed.
    pub async fn rename(&self, session_id: &str, new_name: &str) -> Result<(), HistoryError> {
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return Err(HistoryError::EmptyName);
        }
        self.sessions.rename_session(session_id, trimmed).await?;
        tracing::info!("[History] Renamed session {}", session_id);
        Ok(())
    }

    /// Deletes a session, optimistically.
    ///
    /// The local bookkeeping (anonymous id list, active session reference)
    /// and the `Deleted` signal happen before the server call; a failed
    /// delete is reported but the session stays removed from the local view.
    pub async fn delete(&self, session_id: &str) -> Result<(), RemoteError> {
        if let Err(e) = self.local.remove_anonymous_session(session_id).await {
            tracing::warn!("[History] Failed to prune session id: {}", e);
        }
        if self.local.active_session().await.as_deref() == Some(session_id) {
            if let Err(e) = self.local.clear_active_session().await {
                tracing::warn!("[History] Failed to clear active session: {}", e);
            }
        }
        self.bus.publish(SessionSignal::Deleted {
            session_id: session_id.to_string(),
        });

        match self.sessions.delete_session(session_id).await {
            Ok(()) => Ok(()),
            // Already gone server-side; the optimistic removal stands
            Err(RemoteError::NotFound) => Ok(()),
            Err(e) => {
                tracing::warn!("[History] Server delete of {} failed: {}", session_id, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MemoryStateRepo, MockSessionGateway};
    use leadline_core::session::model::SessionSnapshot;

    fn snapshot(id: &str, message: &str) -> SessionSnapshot {
        let mut s = SessionSnapshot::default();
        s.id = id.to_string();
        s.lead.message = message.to_string();
        s
    }

    fn service(
        sessions: Arc<MockSessionGateway>,
        local: Arc<MemoryStateRepo>,
    ) -> HistoryService {
        HistoryService::new(sessions, local, SignalBus::default())
    }

    #[tokio::test]
    async fn test_authenticated_list_keeps_server_order() {
        let sessions = Arc::new(MockSessionGateway::default());
        sessions.stash_user_sessions(vec![
            snapshot("s-2", "Newest"),
            snapshot("s-1", "Oldest"),
        ]);
        let svc = service(sessions, Arc::new(MemoryStateRepo::default()));

        let list = svc.list_sessions(Some("u-1")).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].title, "Newest");
        assert_eq!(list[1].title, "Oldest");
    }

    #[tokio::test]
    async fn test_anonymous_list_silently_drops_failures() {
        let sessions = Arc::new(MockSessionGateway::default());
        sessions.stash_session(snapshot("ok", "Still here"));
        let local = Arc::new(MemoryStateRepo::default());
        local.add_anonymous_session("ok").await.unwrap();
        local.add_anonymous_session("gone").await.unwrap();
        let svc = service(sessions, local);

        let list = svc.list_sessions(None).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "ok");
    }

    #[tokio::test]
    async fn test_rename_requires_non_blank_name() {
        let sessions = Arc::new(MockSessionGateway::default());
        let svc = service(sessions.clone(), Arc::new(MemoryStateRepo::default()));

        assert!(matches!(
            svc.rename("s-1", "   ").await,
            Err(HistoryError::EmptyName)
        ));
        assert!(sessions.recorded_renames().is_empty());

        svc.rename("s-1", "  Website project  ").await.unwrap();
        assert_eq!(
            sessions.recorded_renames(),
            vec![("s-1".to_string(), "Website project".to_string())]
        );
    }

    #[tokio::test]
    async fn test_delete_prunes_local_list_and_signals() {
        let sessions = Arc::new(MockSessionGateway::default());
        let local = Arc::new(MemoryStateRepo::default());
        local.add_anonymous_session("s-1").await.unwrap();
        local.add_anonymous_session("s-2").await.unwrap();
        local.set_active_session("s-1").await.unwrap();
        let bus = SignalBus::default();
        let mut signals = bus.subscribe();
        let svc = HistoryService::new(sessions.clone(), local.clone(), bus);

        svc.delete("s-1").await.unwrap();

        assert_eq!(local.anonymous_session_ids().await, vec!["s-2".to_string()]);
        assert_eq!(local.active_session().await, None);
        assert_eq!(sessions.recorded_deletes(), vec!["s-1".to_string()]);
        assert_eq!(
            signals.recv().await.unwrap(),
            SessionSignal::Deleted {
                session_id: "s-1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_delete_is_optimistic_on_server_failure() {
        let sessions = Arc::new(MockSessionGateway::default());
        sessions.fail_deletes_with(RemoteError::Server {
            status: 500,
            message: "boom".to_string(),
        });
        let local = Arc::new(MemoryStateRepo::default());
        local.add_anonymous_session("s-1").await.unwrap();
        let svc = service(sessions, local.clone());

        // The error surfaces, but local state is already pruned
        assert!(svc.delete("s-1").await.is_err());
        assert!(local.anonymous_session_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_rename_propagates_server_rejection() {
        let sessions = Arc::new(MockSessionGateway::default());
        sessions.fail_renames_with(RemoteError::Rejected {
            message: "duplicate".to_string(),
        });
        let svc = service(sessions, Arc::new(MemoryStateRepo::default()));
        assert!(matches!(
            svc.rename("s-1", "Taken").await,
            Err(HistoryError::Remote(RemoteError::Rejected { .. }))
        ));
    }
}
