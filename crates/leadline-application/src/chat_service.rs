//! Conversation orchestration.
//!
//! Glues the pure conversation engine to the session synchronizer: every
//! accepted answer fires a fire-and-forget session update, and the terminal
//! transition runs the lead submission with visible retry progress.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use leadline_core::conversation::engine::{ConversationEngine, EngineError};
use leadline_core::conversation::message::ChatMessage;
use leadline_core::conversation::stage::Stage;

use crate::synchronizer::SessionSynchronizer;

const SUBMIT_PROGRESS: &str = "Submitting your details...";
const SUBMIT_CONFIRMATION: &str = "✅ Thank you! We will contact you soon.";

#[derive(Error, Debug)]
pub enum ChatError {
    /// The session could not be created or is gone; input stays disabled.
    #[error("This conversation is unavailable. Please restart to try again.")]
    SessionUnavailable,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// One live conversation bound to a remote session.
pub struct ChatService {
    engine: ConversationEngine,
    synchronizer: SessionSynchronizer,
    session_id: Option<String>,
    session_failed: bool,
    pending_updates: Vec<tokio::task::JoinHandle<()>>,
}

impl ChatService {
    pub fn new(synchronizer: SessionSynchronizer) -> Self {
        Self {
            engine: ConversationEngine::new(),
            synchronizer,
            session_id: None,
            session_failed: false,
            pending_updates: Vec::new(),
        }
    }

    /// Starts a fresh conversation, creating the remote session record.
    ///
    /// On exhausted retries the conversation enters a terminal error state:
    /// every subsequent input is refused until a new conversation starts.
    pub async fn start(&mut self, user_id: Option<&str>) -> Result<(), ChatError> {
        self.engine = ConversationEngine::new();
        self.session_failed = false;
        match self.synchronizer.create_session(user_id).await {
            Ok(session_id) => {
                self.session_id = Some(session_id);
                Ok(())
            }
            Err(e) => {
                tracing::error!("[Chat] Could not start a conversation: {}", e);
                self.session_id = None;
                self.session_failed = true;
                self.engine.push_bot_message(
                    "We're having trouble starting a conversation right now. \
                     Please try again later.",
                );
                Err(ChatError::SessionUnavailable)
            }
        }
    }

    /// Resumes a stored conversation, transparently replacing a stale id.
    pub async fn open(&mut self, session_id: &str, user_id: Option<&str>) -> Result<(), ChatError> {
        self.session_failed = false;
        match self.synchronizer.load_or_create(session_id, user_id).await {
            Ok((id, snapshot)) => {
                self.engine = if snapshot.id.is_empty() {
                    ConversationEngine::new()
                } else {
                    ConversationEngine::from_snapshot(&snapshot)
                };
                self.session_id = Some(id);
                Ok(())
            }
            Err(e) => {
                tracing::error!("[Chat] Could not open session {}: {}", session_id, e);
                self.session_id = None;
                self.session_failed = true;
                Err(ChatError::SessionUnavailable)
            }
        }
    }

    pub fn stage(&self) -> Stage {
        self.engine.stage()
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        self.engine.transcript()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// True once the session is unrecoverable; input must be refused.
    pub fn is_input_disabled(&self) -> bool {
        self.session_failed || self.session_id.is_none()
    }

    /// Handles a free-text answer for the current stage.
    pub async fn handle_text(&mut self, input: &str) -> Result<(), ChatError> {
        let session_id = self.require_session()?;
        let advance = self.engine.submit_answer(input)?;
        self.after_advance(session_id, advance).await
    }

    /// Handles a service selection at the ChooseService stage.
    pub async fn handle_service(&mut self, label: &str) -> Result<(), ChatError> {
        let session_id = self.require_session()?;
        let advance = self.engine.choose_service(label)?;
        self.after_advance(session_id, advance).await
    }

    /// Handles the date/slot/timezone selection at the AskBestTime stage;
    /// this is the terminal transition and triggers the lead submission.
    pub async fn handle_best_time(
        &mut self,
        date: Option<NaiveDate>,
        slot_value: Option<&str>,
        timezone: &str,
        now: NaiveDateTime,
    ) -> Result<(), ChatError> {
        let session_id = self.require_session()?;
        let advance = self
            .engine
            .choose_best_time(date, slot_value, timezone, now)?;
        self.after_advance(session_id, advance).await
    }

    /// Waits for in-flight background session updates (graceful shutdown).
    pub async fn flush(&mut self) {
        for handle in self.pending_updates.drain(..) {
            let _ = handle.await;
        }
    }

    fn require_session(&self) -> Result<String, ChatError> {
        if self.session_failed {
            return Err(ChatError::SessionUnavailable);
        }
        self.session_id
            .clone()
            .ok_or(ChatError::SessionUnavailable)
    }

    async fn after_advance(
        &mut self,
        session_id: String,
        advance: leadline_core::conversation::engine::Advance,
    ) -> Result<(), ChatError> {
        let handle = self.synchronizer.update_field(
            &session_id,
            advance.field,
            advance.value,
            self.engine.transcript().to_vec(),
        );
        self.pending_updates.push(handle);
        self.pending_updates.retain(|h| !h.is_finished());

        if advance.submits_lead {
            self.submit(&session_id).await;
        }
        Ok(())
    }

    /// Runs the final lead submission with visible progress.
    ///
    /// The progress entry is rewritten in place with the retry count; the
    /// confirmation or the classified failure notice is then appended.
    async fn submit(&mut self, session_id: &str) {
        self.engine.push_bot_message(SUBMIT_PROGRESS);

        let lead = self.engine.lead().clone();
        let synchronizer = self.synchronizer.clone();
        let engine = &mut self.engine;
        let result = synchronizer
            .submit_lead(&lead, session_id, |attempt| {
                if attempt > 1 {
                    engine.rewrite_last_message(format!(
                        "{} (retry {})",
                        SUBMIT_PROGRESS,
                        attempt - 1
                    ));
                }
            })
            .await;

        match result {
            Ok(()) => self.engine.push_bot_message(SUBMIT_CONFIRMATION),
            Err(failure) => self.engine.push_bot_message(failure.message),
        }
    }
}
