pub mod auth;
pub mod config;
pub mod conversation;
pub mod error;
pub mod event;
pub mod session;
pub mod state;
pub mod theme;

// Re-export common error type
pub use error::LeadlineError;
