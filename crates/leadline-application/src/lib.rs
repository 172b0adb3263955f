//! Application services.
//!
//! Orchestration over the core domain and the gateway seams: the session
//! synchronizer (all remote side effects with retry tuning), the chat
//! service driving one conversation, the history list, account identity,
//! and the theme provider.

pub mod account_service;
pub mod chat_service;
pub mod history_service;
pub mod synchronizer;
pub mod theme_provider;

#[cfg(test)]
pub(crate) mod mocks;

pub use account_service::{AccountService, AccountStatus};
pub use chat_service::{ChatError, ChatService};
pub use history_service::{HistoryError, HistoryService};
pub use synchronizer::{LinkReport, SessionSynchronizer, SubmitFailure};
pub use theme_provider::ThemeProvider;
