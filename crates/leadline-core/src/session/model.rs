//! Server-side session record mirror.
//!
//! A session is the server-owned record of one conversation: the collected
//! lead fields plus the transcript, addressed by an opaque identifier. The
//! local types here mirror the wire shape (camelCase keys, `messages[]`).

use serde::{Deserialize, Serialize};

use crate::conversation::lead::CollectedLead;
use crate::conversation::message::ChatMessage;

/// Full session record as returned by `GET /api/session/:id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSnapshot {
    /// Opaque session identifier.
    #[serde(alias = "sessionId", alias = "_id")]
    pub id: String,
    /// User-assigned name (via rename), if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Collected lead fields (empty string = not collected yet).
    #[serde(flatten)]
    pub lead: CollectedLead,
    /// Conversation transcript.
    pub messages: Vec<ChatMessage>,
    /// ISO 8601 creation timestamp (server-assigned).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// ISO 8601 last-update timestamp (server-assigned).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl SessionSnapshot {
    /// Display title for the history list: the assigned name if present,
    /// otherwise the conversation's first user message, otherwise a default.
    pub fn title(&self) -> String {
        if let Some(name) = &self.name {
            let trimmed = name.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
        if !self.lead.message.is_empty() {
            return self.lead.message.clone();
        }
        "New conversation".to_string()
    }

    /// Collapses the snapshot into a list row.
    pub fn summarize(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            title: self.title(),
            updated_at: self.updated_at.clone(),
        }
    }
}

/// Partial update body for `PUT /api/session/:id`.
///
/// Only populated fields are serialized; the server merges them into the
/// stored record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<ChatMessage>>,
}

impl SessionPatch {
    /// A patch carrying a single collected field.
    pub fn field(field: crate::conversation::lead::LeadField, value: impl Into<String>) -> Self {
        use crate::conversation::lead::LeadField;
        let value = value.into();
        let mut patch = Self::default();
        match field {
            LeadField::Message => patch.message = Some(value),
            LeadField::Service => patch.service = Some(value),
            LeadField::Name => patch.name = Some(value),
            LeadField::Email => patch.email = Some(value),
            LeadField::Phone => patch.phone = Some(value),
            LeadField::BestTime => patch.best_time = Some(value),
        }
        patch
    }
}

/// One row of the navigation/history list.
///
/// The server returns sessions recency-sorted; the list is not re-sorted
/// client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub updated_at: Option<String>,
}
