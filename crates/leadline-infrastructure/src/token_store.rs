//! Persistent storage for the auth token triple.
//!
//! Tokens land in `tokens.json` with user-only permissions. Cleared
//! outright on irrecoverable auth failure (the login flow writes a fresh
//! set).

use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;

use leadline_core::auth::{AuthTokenSet, TokenRepository};
use leadline_core::error::{LeadlineError, Result};

use crate::paths::LeadlinePaths;

/// File-backed implementation of [`TokenRepository`].
#[derive(Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn open(paths: &LeadlinePaths) -> Self {
        Self {
            path: paths.tokens_file(),
        }
    }
}

#[async_trait]
impl TokenRepository for TokenStore {
    async fn load(&self) -> Result<Option<AuthTokenSet>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            if !path.exists() {
                return Ok(None);
            }
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                return Ok(None);
            }
            let tokens: AuthTokenSet = serde_json::from_str(&content)?;
            Ok(Some(tokens))
        })
        .await
        .map_err(|e| LeadlineError::internal(format!("Failed to join task: {}", e)))?
    }

    async fn save(&self, tokens: &AuthTokenSet) -> Result<()> {
        let path = self.path.clone();
        let tokens = tokens.clone();
        tokio::task::spawn_blocking(move || {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_string_pretty(&tokens)?;
            fs::write(&path, json)?;

            // Tokens are credentials: user read/write only
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
            }

            Ok(())
        })
        .await
        .map_err(|e| LeadlineError::internal(format!("Failed to join task: {}", e)))?
    }

    async fn clear(&self) -> Result<()> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            if path.exists() {
                fs::remove_file(&path)?;
            }
            Ok(())
        })
        .await
        .map_err(|e| LeadlineError::internal(format!("Failed to join task: {}", e)))?
    }
}
