//! Conversation domain: stages, transcript, lead record, validation,
//! scheduling, and the state machine that ties them together.

pub mod engine;
pub mod lead;
pub mod message;
pub mod schedule;
pub mod stage;
pub mod validate;

pub use engine::{Advance, ConversationEngine, EngineError};
pub use lead::{CollectedLead, LeadField, SERVICES};
pub use message::{ChatMessage, Sender};
pub use stage::{Stage, GREETING};
pub use validate::ValidationError;
