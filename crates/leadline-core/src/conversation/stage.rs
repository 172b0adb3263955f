//! Conversation stage model.
//!
//! The conversation is a fixed linear sequence of collection stages. Each
//! stage gathers exactly one lead field; there is no branching or skipping,
//! except when resuming an existing session, where the stage is reconstructed
//! from which fields are already populated.

use serde::{Deserialize, Serialize};
use strum::Display;

use super::lead::CollectedLead;

/// Greeting shown when a fresh conversation opens.
pub const GREETING: &str = "👋 How may I help you?";

/// The current position in the fixed conversation sequence.
///
/// Stages are strictly ordered; `next()` advances exactly one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Stage {
    /// Waiting for the visitor's opening message.
    Initial,
    /// Waiting for a service selection from the fixed label set.
    ChooseService,
    /// Collecting the visitor's full name.
    AskName,
    /// Collecting the visitor's email address.
    AskEmail,
    /// Collecting the visitor's contact number.
    AskPhone,
    /// Collecting the preferred meeting date, time slot, and timezone.
    AskBestTime,
    /// The lead has been submitted; the conversation is complete.
    Done,
}

impl Stage {
    /// Returns the stage that follows this one.
    ///
    /// `Done` is terminal and returns itself.
    pub fn next(self) -> Stage {
        match self {
            Stage::Initial => Stage::ChooseService,
            Stage::ChooseService => Stage::AskName,
            Stage::AskName => Stage::AskEmail,
            Stage::AskEmail => Stage::AskPhone,
            Stage::AskPhone => Stage::AskBestTime,
            Stage::AskBestTime => Stage::Done,
            Stage::Done => Stage::Done,
        }
    }

    /// Returns the fixed bot prompt that introduces this stage.
    ///
    /// `Initial` is covered by [`GREETING`] and `Done` has no prompt (the
    /// confirmation or failure message is appended by the submit flow).
    pub fn prompt(self) -> Option<&'static str> {
        match self {
            Stage::Initial => Some(GREETING),
            Stage::ChooseService => Some("Please select a service from the list below 👇"),
            Stage::AskName => Some("Great! Please tell me your full name."),
            Stage::AskEmail => Some("Please provide your email."),
            Stage::AskPhone => Some("Please provide your contact number."),
            Stage::AskBestTime => Some("Please select a date, time slot, and timezone 📅"),
            Stage::Done => None,
        }
    }

    /// Whether the conversation has finished collecting fields.
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done)
    }

    /// Reconstructs the stage from the fields already populated on a lead.
    ///
    /// Used when resuming a session loaded from the server: the most advanced
    /// populated field wins. This is intentionally presence-based and assumes
    /// fields are filled monotonically, one per stage.
    pub fn infer(lead: &CollectedLead) -> Stage {
        if !lead.best_time.is_empty() {
            Stage::Done
        } else if !lead.phone.is_empty() {
            Stage::AskBestTime
        } else if !lead.email.is_empty() {
            Stage::AskPhone
        } else if !lead.name.is_empty() {
            Stage::AskEmail
        } else if !lead.service.is_empty() {
            Stage::AskName
        } else if !lead.message.is_empty() {
            Stage::ChooseService
        } else {
            Stage::Initial
        }
    }
}
