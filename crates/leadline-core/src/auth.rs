//! Authentication model and seams.
//!
//! Tokens come from a hosted identity provider; the client only stores them,
//! attaches them to requests, and refreshes reactively on 401.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::gateway::RemoteError;

/// The token triple held in client-side persistent storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokenSet {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub id_token: String,
}

impl AuthTokenSet {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_empty()
    }
}

/// Identity claims returned by the provider's userinfo endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Stable subject identifier; used as the session owner id.
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Identity provider operations (userinfo proxy + token refresh).
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// `GET /api/userinfo` with a bearer token; `Unauthorized` on 401.
    async fn userinfo(&self, access_token: &str) -> std::result::Result<UserInfo, RemoteError>;

    /// `POST /api/refresh-token` — exchanges the refresh token for a new
    /// token triple.
    async fn refresh(
        &self,
        refresh_token: &str,
    ) -> std::result::Result<AuthTokenSet, RemoteError>;
}

/// Persistent storage for the token triple.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn load(&self) -> Result<Option<AuthTokenSet>>;
    async fn save(&self, tokens: &AuthTokenSet) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}
