//! HTTP implementation of the lead intake gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use leadline_core::config::ApiConfig;
use leadline_core::conversation::lead::CollectedLead;
use leadline_core::session::gateway::{LeadGateway, RemoteError};

use crate::error::{from_body, from_reqwest, from_status};

/// Lead intake client (`POST /api/leads`).
#[derive(Clone)]
pub struct LeadApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitLeadRequest<'a> {
    #[serde(flatten)]
    lead: &'a CollectedLead,
    session_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct AckEnvelope {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

impl LeadApiClient {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

#[async_trait]
impl LeadGateway for LeadApiClient {
    async fn submit_lead(
        &self,
        lead: &CollectedLead,
        session_id: &str,
    ) -> Result<(), RemoteError> {
        let body = SubmitLeadRequest { lead, session_id };
        let response = self
            .client
            .post(format!("{}/api/leads", self.base_url))
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
            return Err(RemoteError::Rejected {
                message: envelope
                    .error
                    .unwrap_or_else(|| "Lead submission rejected".to_string()),
            });
        }
        tracing::info!("[LeadApi] Submitted lead for session {}", session_id);
        Ok(())
    }
}
