//! Session synchronization against the remote store.
//!
//! The synchronizer owns every remote side effect of a conversation:
//! creating the session record, pushing collected fields as they arrive,
//! recovering from stale session references, and the final lead submission.
//! Each operation carries its own retry tuning; only connectivity loss and
//! 5xx responses are retried.

use std::sync::Arc;

use leadline_api::retry_with_backoff;
use leadline_core::config::SyncConfig;
use leadline_core::conversation::lead::{CollectedLead, LeadField};
use leadline_core::conversation::message::ChatMessage;
use leadline_core::event::{SessionSignal, SignalBus};
use leadline_core::session::gateway::{
    FailureClass, LeadGateway, RemoteError, SessionGateway,
};
use leadline_core::session::model::{SessionPatch, SessionSnapshot};
use leadline_core::state::LocalStateRepository;

/// Outcome of a lead submission that exhausted its retries.
///
/// `message` is the user-facing notice for the transcript, already including
/// the human contact fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitFailure {
    pub class: FailureClass,
    pub message: String,
}

/// Result of linking remembered anonymous sessions to an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// Sessions now owned by the user.
    pub linked: usize,
    /// Sessions the server no longer knows about (pruned locally).
    pub expired: usize,
    /// Sessions kept locally because the link attempt failed transiently.
    pub failed: usize,
}

/// Drives all remote persistence for conversations.
#[derive(Clone)]
pub struct SessionSynchronizer {
    sessions: Arc<dyn SessionGateway>,
    leads: Arc<dyn LeadGateway>,
    local: Arc<dyn LocalStateRepository>,
    bus: SignalBus,
    sync: SyncConfig,
    contact_email: String,
}

impl SessionSynchronizer {
    pub fn new(
        sessions: Arc<dyn SessionGateway>,
        leads: Arc<dyn LeadGateway>,
        local: Arc<dyn LocalStateRepository>,
        bus: SignalBus,
        sync: SyncConfig,
        contact_email: impl Into<String>,
    ) -> Self {
        Self {
            sessions,
            leads,
            local,
            bus,
            sync,
            contact_email: contact_email.into(),
        }
    }

    pub fn bus(&self) -> &SignalBus {
        &self.bus
    }

    /// Creates a session record, retrying with backoff.
    ///
    /// Failure here is terminal for the conversation: the caller disables
    /// input. For anonymous sessions the new id is remembered locally so the
    /// conversation can be revisited and later linked to an account.
    pub async fn create_session(&self, user_id: Option<&str>) -> Result<String, RemoteError> {
        let sessions = self.sessions.clone();
        let session_id = retry_with_backoff(self.sync.create, "create_session", move |_| {
            let sessions = sessions.clone();
            let user_id = user_id.map(str::to_string);
            async move { sessions.create_session(user_id.as_deref()).await }
        })
        .await?;

        if user_id.is_none() {
            if let Err(e) = self.local.add_anonymous_session(&session_id).await {
                tracing::warn!("[Synchronizer] Failed to remember anonymous session: {}", e);
            }
        }
        if let Err(e) = self.local.set_active_session(&session_id).await {
            tracing::warn!("[Synchronizer] Failed to record active session: {}", e);
        }

        self.bus.publish(SessionSignal::Created {
            session_id: session_id.clone(),
        });
        tracing::info!("[Synchronizer] Session {} created", session_id);
        Ok(session_id)
    }

    /// Pushes one collected field (plus the current transcript) to the
    /// server as a fire-and-forget background task.
    ///
    /// The conversation never waits on this: on exhausted retries the local
    /// state is simply ahead of the server and a `SyncLagged` signal is
    /// published. Updates carry no sequencing; two in-flight updates may
    /// land out of order.
    pub fn update_field(
        &self,
        session_id: &str,
        field: LeadField,
        value: String,
        transcript: Vec<ChatMessage>,
    ) -> tokio::task::JoinHandle<()> {
        let this = self.clone();
        let session_id = session_id.to_string();
        tokio::spawn(async move {
            this.push_update(&session_id, field, value, transcript).await;
        })
    }

    pub(crate) async fn push_update(
        &self,
        session_id: &str,
        field: LeadField,
        value: String,
        transcript: Vec<ChatMessage>,
    ) {
        let mut patch = SessionPatch::field(field, value);
        patch.messages = Some(transcript);

        let sessions = self.sessions.clone();
        let patch_ref = &patch;
        let result = retry_with_backoff(self.sync.update, "update_session", move |_| {
            let sessions = sessions.clone();
            let session_id = session_id.to_string();
            let patch = patch_ref.clone();
            async move { sessions.update_session(&session_id, &patch).await }
        })
        .await;

        match result {
            Ok(()) => {
                self.bus.publish(SessionSignal::Updated {
                    session_id: session_id.to_string(),
                    field,
                });
            }
            Err(e) => {
                tracing::warn!(
                    "[Synchronizer] Update of {} on session {} gave up: {}",
                    field,
                    session_id,
                    e
                );
                self.bus.publish(SessionSignal::SyncLagged {
                    session_id: session_id.to_string(),
                });
            }
        }
    }

    /// Loads a session, transparently replacing a stale reference.
    ///
    /// A 404 means the server no longer has the record (expired or deleted
    /// elsewhere); a fresh session is created, a transient notice published,
    /// and the replacement returned. Only transient load failures surface as
    /// errors.
    pub async fn load_or_create(
        &self,
        session_id: &str,
        user_id: Option<&str>,
    ) -> Result<(String, SessionSnapshot), RemoteError> {
        match self.sessions.load_session(session_id).await {
            Ok(snapshot) => {
                if let Err(e) = self.local.set_active_session(session_id).await {
                    tracing::warn!("[Synchronizer] Failed to record active session: {}", e);
                }
                Ok((session_id.to_string(), snapshot))
            }
            Err(RemoteError::NotFound) => {
                tracing::info!(
                    "[Synchronizer] Session {} no longer exists; starting fresh",
                    session_id
                );
                if let Err(e) = self.local.remove_anonymous_session(session_id).await {
                    tracing::warn!("[Synchronizer] Failed to prune stale session id: {}", e);
                }
                let replacement = self.create_session(user_id).await?;
                self.bus.publish(SessionSignal::Notice {
                    message: "Your previous conversation expired; starting a new one."
                        .to_string(),
                });
                Ok((replacement, SessionSnapshot::default()))
            }
            Err(e) => Err(e),
        }
    }

    /// Submits the completed lead, retrying with backoff.
    ///
    /// `on_attempt` fires at the start of every attempt (1-based) so the
    /// caller can surface retry progress. On exhaustion the failure is
    /// classified into a distinct user-facing message.
    pub async fn submit_lead<F>(
        &self,
        lead: &CollectedLead,
        session_id: &str,
        mut on_attempt: F,
    ) -> Result<(), SubmitFailure>
    where
        F: FnMut(u32) + Send,
    {
        let leads = self.leads.clone();
        let result = retry_with_backoff(self.sync.submit, "submit_lead", move |attempt| {
            on_attempt(attempt);
            let leads = leads.clone();
            let lead = lead.clone();
            let session_id = session_id.to_string();
            async move { leads.submit_lead(&lead, &session_id).await }
        })
        .await;

        result.map_err(|e| self.classify_submit_failure(e))
    }

    fn classify_submit_failure(&self, err: RemoteError) -> SubmitFailure {
        let class = err.class();
        let contact = &self.contact_email;
        let message = match class {
            FailureClass::Offline => format!(
                "You appear to be offline. Please check your connection and try again, \
                 or email us at {}.",
                contact
            ),
            FailureClass::ClientError => format!(
                "We couldn't process your request. Please contact us directly at {}.",
                contact
            ),
            FailureClass::ServerError => format!(
                "Our server is having trouble right now. Please try again later, \
                 or email us at {}.",
                contact
            ),
            FailureClass::Other => format!(
                "Something went wrong while submitting your details. \
                 Please contact us at {}.",
                contact
            ),
        };
        tracing::error!("[Synchronizer] Lead submission gave up: {}", err);
        SubmitFailure { class, message }
    }

    /// Attaches every remembered anonymous session to the given account.
    ///
    /// Individual failures never abort the pass: sessions the server has
    /// forgotten (404) are treated as expired and pruned alongside the
    /// successfully linked ones; transient failures keep the id for a later
    /// attempt.
    pub async fn link_anonymous_sessions(&self, user_id: &str) -> LinkReport {
        let mut report = LinkReport::default();
        for session_id in self.local.anonymous_session_ids().await {
            match self.sessions.link_user(&session_id, user_id).await {
                Ok(()) => {
                    report.linked += 1;
                    self.forget_anonymous(&session_id).await;
                }
                Err(RemoteError::NotFound) => {
                    report.expired += 1;
                    self.forget_anonymous(&session_id).await;
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        "[Synchronizer] Failed to link session {}: {}",
                        session_id,
                        e
                    );
                }
            }
        }
        tracing::info!(
            "[Synchronizer] Linked {} session(s) for user {} ({} expired, {} kept)",
            report.linked,
            user_id,
            report.expired,
            report.failed
        );
        report
    }

    async fn forget_anonymous(&self, session_id: &str) {
        if let Err(e) = self.local.remove_anonymous_session(session_id).await {
            tracing::warn!("[Synchronizer] Failed to prune session id: {}", e);
        }
    }
}
