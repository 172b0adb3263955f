//! HTTP implementation of the identity provider gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use leadline_core::auth::{AuthGateway, AuthTokenSet, UserInfo};
use leadline_core::config::ApiConfig;
use leadline_core::session::gateway::RemoteError;

use crate::error::{from_body, from_reqwest, from_status};

/// Client for the userinfo proxy and refresh endpoints.
#[derive(Clone)]
pub struct AuthApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    id_token: String,
}

impl AuthApiClient {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

#[async_trait]
impl AuthGateway for AuthApiClient {
    async fn userinfo(&self, access_token: &str) -> Result<UserInfo, RemoteError> {
        let response = self
            .client
            .get(format!("{}/api/userinfo", self.base_url))
            .header("Authorization", format!("Bearer {}", access_token))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(from_reqwest)?;

        if !response.status().is_success() {
            return Err(from_status(response).await);
        }

        response.json().await.map_err(from_body)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthTokenSet, RemoteError> {
        let response = self
            .client
            .post(format!("{}/api/refresh-token", self.base_url))
            .json(&RefreshRequest { refresh_token })
            .timeout(self.timeout)
            .send()
            .await
            .map_err(from_reqwest)?;

        if !response.status().is_success() {
            return Err(from_status(response).await);
        }

        let tokens: RefreshResponse = response.json().await.map_err(from_body)?;
        tracing::debug!("[AuthApi] Token refresh succeeded");
        Ok(AuthTokenSet {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            id_token: tokens.id_token,
        })
    }
}
