//! Chat transcript message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Scripted bot prompt or status message.
    Bot,
    /// Visitor input, echoed verbatim.
    User,
}

/// A single entry in the conversation transcript.
///
/// Entries are append-only and ordered by insertion. The only permitted
/// mutation is rewriting the text of the last entry while the lead submission
/// is being retried (to reflect the retry count).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message author.
    #[serde(rename = "from")]
    pub sender: Sender,
    /// Message body.
    pub text: String,
    /// When the entry was appended.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Creates a bot message stamped with the current time.
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a user message stamped with the current time.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_uses_from_key() {
        let msg = ChatMessage::bot("hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["from"], "bot");
        assert_eq!(json["text"], "hello");
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn test_user_sender_round_trips() {
        let msg = ChatMessage::user("hi");
        let json = serde_json::to_string(&msg).unwrap();
        let back: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sender, Sender::User);
        assert_eq!(back.text, "hi");
    }
}
