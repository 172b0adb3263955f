//! Local persistence for the leadline client.
//!
//! Everything here is file-backed: configuration, the small client state
//! record, and the auth token triple. Remote access lives in `leadline-api`.

pub mod config_store;
pub mod local_state;
pub mod paths;
pub mod token_store;

pub use local_state::LocalStateStore;
pub use paths::LeadlinePaths;
pub use token_store::TokenStore;
