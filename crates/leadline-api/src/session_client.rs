//! HTTP implementation of the session store gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use leadline_core::config::ApiConfig;
use leadline_core::session::gateway::{RemoteError, SessionGateway};
use leadline_core::session::model::{SessionPatch, SessionSnapshot};

use crate::error::{from_body, from_reqwest, from_status};

/// Session store client for the `/api/session/...` endpoints.
#[derive(Clone)]
pub struct SessionApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionResponse {
    success: bool,
    #[serde(default)]
    session_id: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionEnvelope {
    success: bool,
    #[serde(default)]
    session: Option<SessionSnapshot>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionsEnvelope {
    success: bool,
    #[serde(default)]
    sessions: Vec<SessionSnapshot>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AckEnvelope {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RenameRequest {
    new_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LinkUserRequest {
    session_id: String,
    user_id: String,
}

fn rejected(error: Option<String>) -> RemoteError {
    RemoteError::Rejected {
        message: error.unwrap_or_else(|| "Request rejected".to_string()),
    }
}

impl SessionApiClient {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl SessionGateway for SessionApiClient {
    async fn create_session(&self, user_id: Option<&str>) -> Result<String, RemoteError> {
        let body = CreateSessionRequest {
            user_id: user_id.map(str::to_string),
        };
        let response = self
            .client
            .post(self.url("/api/session"))
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(from_reqwest)?;

        if !response.status().is_success() {
            return Err(from_status(response).await);
        }

        let envelope: CreateSessionResponse = response.json().await.map_err(from_body)?;
        if !envelope.success || envelope.session_id.is_empty() {
            return Err(rejected(envelope.error));
        }
        tracing::debug!("[SessionApi] Created session {}", envelope.session_id);
        Ok(envelope.session_id)
    }

    async fn update_session(
        &self,
        session_id: &str,
        patch: &SessionPatch,
    ) -> Result<(), RemoteError> {
        let response = self
            .client
            .put(self.url(&format!("/api/session/{}", session_id)))
            .json(patch)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(from_reqwest)?;

        if !response.status().is_success() {
            return Err(from_status(response).await);
        }

        let envelope: AckEnvelope = response.json().await.map_err(from_body)?;
        if !envelope.success {
            return Err(rejected(envelope.error));
        }
        Ok(())
    }

    async fn load_session(&self, session_id: &str) -> Result<SessionSnapshot, RemoteError> {
        let response = self
            .client
            .get(self.url(&format!("/api/session/{}", session_id)))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(from_reqwest)?;

        if !response.status().is_success() {
            return Err(from_status(response).await);
        }

        let envelope: SessionEnvelope = response.json().await.map_err(from_body)?;
        match envelope.session {
            Some(session) if envelope.success => Ok(session),
            _ => Err(rejected(envelope.error)),
        }
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), RemoteError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/session/{}", session_id)))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(from_reqwest)?;

        if !response.status().is_success() {
            return Err(from_status(response).await);
        }

        let envelope: AckEnvelope = response.json().await.map_err(from_body)?;
        if !envelope.success {
            return Err(rejected(envelope.error));
        }
        tracing::debug!("[SessionApi] Deleted session {}", session_id);
        Ok(())
    }

    async fn rename_session(&self, session_id: &str, new_name: &str) -> Result<(), RemoteError> {
        let body = RenameRequest {
            new_name: new_name.to_string(),
        };
        let response = self
            .client
            .patch(self.url(&format!("/api/session/{}/rename", session_id)))
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(from_reqwest)?;

        if !response.status().is_success() {
            return Err(from_status(response).await);
        }

        let envelope: AckEnvelope = response.json().await.map_err(from_body)?;
        if !envelope.success {
            return Err(rejected(envelope.error));
        }
        Ok(())
    }

    async fn list_user_sessions(
        &self,
        user_id: &str,
    ) -> Result<Vec<SessionSnapshot>, RemoteError> {
        let response = self
            .client
            .get(self.url(&format!("/api/session/user/{}", user_id)))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(from_reqwest)?;

        if !response.status().is_success() {
            return Err(from_status(response).await);
        }

        let envelope: SessionsEnvelope = response.json().await.map_err(from_body)?;
        if !envelope.success {
            return Err(rejected(envelope.error));
        }
        Ok(envelope.sessions)
    }

    async fn link_user(&self, session_id: &str, user_id: &str) -> Result<(), RemoteError> {
        let body = LinkUserRequest {
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
        };
        let response = self
            .client
            .post(self.url("/api/session/link-user"))
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(from_reqwest)?;

        if !response.status().is_success() {
            return Err(from_status(response).await);
        }

        let envelope: AckEnvelope = response.json().await.map_err(from_body)?;
        if !envelope.success {
            return Err(rejected(envelope.error));
        }
        tracing::debug!(
            "[SessionApi] Linked session {} to user {}",
            session_id,
            user_id
        );
        Ok(())
    }
}
