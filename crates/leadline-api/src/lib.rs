//! HTTP gateway implementations.
//!
//! Thin reqwest clients behind the core gateway traits, plus the shared
//! retry/backoff helper. Transport failures are mapped onto the
//! `RemoteError` taxonomy; retry decisions live with the callers.

pub mod auth_client;
pub mod backoff;
mod error;
pub mod lead_client;
pub mod session_client;

pub use auth_client::AuthApiClient;
pub use backoff::retry_with_backoff;
pub use lead_client::LeadApiClient;
pub use session_client::SessionApiClient;
