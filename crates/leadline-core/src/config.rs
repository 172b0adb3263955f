//! Application configuration.
//!
//! The retry/backoff numbers are tuned constants, not derived invariants;
//! they are carried as configuration so deployments can adjust them.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounded exponential backoff parameters for one remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles with each subsequent retry.
    pub base_delay_ms: u64,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            base_delay_ms,
        }
    }

    /// Delay to wait after `completed_attempts` attempts have failed.
    pub fn delay_after(&self, completed_attempts: u32) -> Duration {
        let exponent = completed_attempts.saturating_sub(1).min(16);
        Duration::from_millis(self.base_delay_ms.saturating_mul(1u64 << exponent))
    }
}

/// Retry tuning for the three synchronizer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Session creation: failure here is terminal for the conversation.
    pub create: RetryPolicy,
    /// Best-effort field updates.
    pub update: RetryPolicy,
    /// Final lead submission.
    pub submit: RetryPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            create: RetryPolicy::new(3, 1_000),
            update: RetryPolicy::new(2, 500),
            submit: RetryPolicy::new(2, 1_000),
        }
    }
}

/// Remote endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the session/lead API.
    pub base_url: String,
    /// Hosted login page; a `return_to` query parameter is appended.
    pub login_url: String,
    /// Human fallback shown when lead submission fails for good.
    pub contact_email: String,
    /// Per-request timeout.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.leadline.dev".to_string(),
            login_url: "https://auth.leadline.dev/login".to_string(),
            contact_email: "hello@leadline.dev".to_string(),
            request_timeout_secs: 15,
        }
    }
}

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub sync: SyncConfig,
}
