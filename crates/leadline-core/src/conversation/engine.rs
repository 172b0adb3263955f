//! The conversation state machine.
//!
//! Drives the linear sequence of collection stages, validates each answer,
//! and maintains the chat transcript. The engine is pure application state:
//! persistence side effects (session updates, lead submission) are driven by
//! the caller from the [`Advance`] it returns.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use super::lead::{is_known_service, CollectedLead, LeadField};
use super::message::ChatMessage;
use super::schedule::{format_best_time, validate_best_time};
use super::stage::Stage;
use super::validate::{validate_email, validate_name, validate_phone, ValidationError};
use crate::session::model::SessionSnapshot;

/// Errors surfaced by the engine to the caller.
///
/// None of these advance the stage; the caller re-prompts the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A field answer failed validation (the echoed user message stays).
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Text input arrived at a stage that expects a selection instead.
    #[error("No text input is expected at the {stage} stage")]
    UnexpectedStage { stage: Stage },
    /// A service label outside the fixed set.
    #[error("Unknown service: {0}")]
    UnknownService(String),
    /// Blank input; nothing is echoed or validated.
    #[error("Please type a message.")]
    EmptyInput,
}

/// The outcome of a successful stage transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    /// The lead field that was just populated (the session-update delta).
    pub field: LeadField,
    /// The stored value.
    pub value: String,
    /// The stage the conversation advanced to.
    pub stage: Stage,
    /// True on the terminal transition: the full lead must now be submitted.
    pub submits_lead: bool,
}

/// Scripted multi-turn conversation over the fixed stage sequence.
#[derive(Debug, Clone)]
pub struct ConversationEngine {
    stage: Stage,
    lead: CollectedLead,
    transcript: Vec<ChatMessage>,
}

impl ConversationEngine {
    /// Creates a fresh conversation with the greeting in the transcript.
    pub fn new() -> Self {
        let mut transcript = Vec::new();
        if let Some(greeting) = Stage::Initial.prompt() {
            transcript.push(ChatMessage::bot(greeting));
        }
        Self {
            stage: Stage::Initial,
            lead: CollectedLead::default(),
            transcript,
        }
    }

    /// Reconstructs a conversation from a loaded session snapshot.
    ///
    /// The transcript is taken from the server record and the stage is
    /// inferred from which fields are populated (most advanced wins).
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        let stage = Stage::infer(&snapshot.lead);
        let mut transcript = snapshot.messages.clone();
        if transcript.is_empty() {
            if let Some(greeting) = Stage::Initial.prompt() {
                transcript.push(ChatMessage::bot(greeting));
            }
        }
        Self {
            stage,
            lead: snapshot.lead.clone(),
            transcript,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn lead(&self) -> &CollectedLead {
        &self.lead
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Appends a bot status message (submission progress, confirmations).
    pub fn push_bot_message(&mut self, text: impl Into<String>) {
        self.transcript.push(ChatMessage::bot(text));
    }

    /// Rewrites the text of the last transcript entry.
    ///
    /// Only used while the lead submission is retried, to reflect the retry
    /// count; every other entry is immutable.
    pub fn rewrite_last_message(&mut self, text: impl Into<String>) {
        if let Some(last) = self.transcript.last_mut() {
            last.text = text.into();
        }
    }

    /// Submits a free-text answer for the current stage.
    ///
    /// The user's message is echoed to the transcript before validation and
    /// is not retracted when validation fails; on failure the stage does not
    /// advance. On success the corresponding field is stored, the stage
    /// advances exactly one step, and the new stage's bot prompt is appended.
    pub fn submit_answer(&mut self, raw_input: &str) -> Result<Advance, EngineError> {
        let input = raw_input.trim();
        if input.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        let field = match self.stage {
            Stage::Initial => LeadField::Message,
            Stage::AskName => LeadField::Name,
            Stage::AskEmail => LeadField::Email,
            Stage::AskPhone => LeadField::Phone,
            stage => return Err(EngineError::UnexpectedStage { stage }),
        };

        // Echo first; a rejected answer stays visible in the transcript.
        self.transcript.push(ChatMessage::user(input));

        match field {
            LeadField::Name => validate_name(input)?,
            LeadField::Email => validate_email(input)?,
            LeadField::Phone => validate_phone(input)?,
            _ => {}
        }

        Ok(self.advance(field, input.to_string()))
    }

    /// Selects one of the fixed service labels, advancing to AskName.
    pub fn choose_service(&mut self, label: &str) -> Result<Advance, EngineError> {
        if self.stage != Stage::ChooseService {
            return Err(EngineError::UnexpectedStage { stage: self.stage });
        }
        if !is_known_service(label) {
            return Err(EngineError::UnknownService(label.to_string()));
        }
        self.transcript.push(ChatMessage::user(label));
        Ok(self.advance(LeadField::Service, label.to_string()))
    }

    /// Completes the best-time stage: both a non-past date and an available
    /// slot are required. This is the terminal transition; the returned
    /// [`Advance`] asks the caller to submit the full lead.
    pub fn choose_best_time(
        &mut self,
        date: Option<NaiveDate>,
        slot_value: Option<&str>,
        timezone: &str,
        now: NaiveDateTime,
    ) -> Result<Advance, EngineError> {
        if self.stage != Stage::AskBestTime {
            return Err(EngineError::UnexpectedStage { stage: self.stage });
        }
        validate_best_time(date, slot_value, now)?;

        // Both validated present above
        let best_time = format_best_time(
            date.expect("validated date"),
            slot_value.expect("validated slot"),
            timezone,
        );
        self.transcript.push(ChatMessage::user(best_time.clone()));
        Ok(self.advance(LeadField::BestTime, best_time))
    }

    fn advance(&mut self, field: LeadField, value: String) -> Advance {
        self.lead.set(field, value.clone());
        self.stage = self.stage.next();
        // next() never yields Initial, so this is always a stage prompt
        if let Some(prompt) = self.stage.prompt() {
            self.transcript.push(ChatMessage::bot(prompt));
        }
        Advance {
            field,
            value,
            stage: self.stage,
            submits_lead: self.stage.is_terminal(),
        }
    }
}

impl Default for ConversationEngine {
    fn default() -> Self {
        Self::new()
    }
}
