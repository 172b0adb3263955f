//! Session domain: the server-owned record mirror and the remote seams.

pub mod gateway;
pub mod model;

pub use gateway::{FailureClass, LeadGateway, RemoteError, SessionGateway};
pub use model::{SessionPatch, SessionSnapshot, SessionSummary};
