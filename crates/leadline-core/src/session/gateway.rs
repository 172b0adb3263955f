//! Remote persistence seam.
//!
//! The session store and lead intake live behind these traits so the
//! application layer stays independent of the HTTP transport (and so tests
//! can swap in in-memory fakes).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{SessionPatch, SessionSnapshot};
use crate::conversation::lead::CollectedLead;

/// Failure taxonomy for remote calls.
///
/// Retryable variants (connectivity loss, 5xx) are retried with bounded
/// backoff by the synchronizer; the rest fail fast.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// 404: the addressed session no longer exists.
    #[error("Not found")]
    NotFound,
    /// 401: credentials missing or expired.
    #[error("Unauthorized")]
    Unauthorized,
    /// Connection refused, DNS failure, timeout: likely offline.
    #[error("Network unavailable: {message}")]
    Offline { message: String },
    /// Any other 4xx.
    #[error("Client error ({status}): {message}")]
    Client { status: u16, message: String },
    /// 5xx.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
    /// HTTP 200 but `success: false` in the envelope.
    #[error("Request rejected: {message}")]
    Rejected { message: String },
    /// Anything else (malformed body, unexpected transport failure).
    #[error("{message}")]
    Other { message: String },
}

impl RemoteError {
    /// Whether a retry with backoff has a chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Offline { .. } | Self::Server { .. })
    }

    /// Buckets the failure for the user-facing submission notice.
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Offline { .. } => FailureClass::Offline,
            Self::NotFound | Self::Unauthorized | Self::Client { .. } => FailureClass::ClientError,
            Self::Server { .. } => FailureClass::ServerError,
            Self::Rejected { .. } | Self::Other { .. } => FailureClass::Other,
        }
    }
}

/// Coarse failure class used to pick the user-facing message when lead
/// submission exhausts its retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    Offline,
    ClientError,
    ServerError,
    Other,
}

/// Remote session store operations (`/api/session/...`).
#[async_trait]
pub trait SessionGateway: Send + Sync {
    /// `POST /api/session` — creates a session, optionally owned by a user.
    async fn create_session(&self, user_id: Option<&str>) -> Result<String, RemoteError>;

    /// `PUT /api/session/:id` — best-effort partial update.
    async fn update_session(
        &self,
        session_id: &str,
        patch: &SessionPatch,
    ) -> Result<(), RemoteError>;

    /// `GET /api/session/:id` — loads the full record; `NotFound` on 404.
    async fn load_session(&self, session_id: &str) -> Result<SessionSnapshot, RemoteError>;

    /// `DELETE /api/session/:id`.
    async fn delete_session(&self, session_id: &str) -> Result<(), RemoteError>;

    /// `PATCH /api/session/:id/rename`.
    async fn rename_session(&self, session_id: &str, new_name: &str) -> Result<(), RemoteError>;

    /// `GET /api/session/user/:userId` — server returns recency-sorted.
    async fn list_user_sessions(&self, user_id: &str) -> Result<Vec<SessionSnapshot>, RemoteError>;

    /// `POST /api/session/link-user` — attaches one session to a user.
    async fn link_user(&self, session_id: &str, user_id: &str) -> Result<(), RemoteError>;
}

/// Lead intake (`POST /api/leads`).
#[async_trait]
pub trait LeadGateway: Send + Sync {
    /// Single idempotent-intent submission of the completed lead.
    async fn submit_lead(&self, lead: &CollectedLead, session_id: &str)
        -> Result<(), RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryability() {
        assert!(RemoteError::Offline {
            message: "timed out".into()
        }
        .is_retryable());
        assert!(RemoteError::Server {
            status: 503,
            message: "unavailable".into()
        }
        .is_retryable());
        assert!(!RemoteError::NotFound.is_retryable());
        assert!(!RemoteError::Client {
            status: 422,
            message: "bad".into()
        }
        .is_retryable());
        assert!(!RemoteError::Rejected {
            message: "nope".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_failure_classes() {
        assert_eq!(
            RemoteError::Offline {
                message: "x".into()
            }
            .class(),
            FailureClass::Offline
        );
        assert_eq!(RemoteError::NotFound.class(), FailureClass::ClientError);
        assert_eq!(
            RemoteError::Server {
                status: 500,
                message: "x".into()
            }
            .class(),
            FailureClass::ServerError
        );
        assert_eq!(
            RemoteError::Other {
                message: "x".into()
            }
            .class(),
            FailureClass::Other
        );
    }
}
