//! Unified path management for leadline client files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/leadline/          # Config directory
//! ├── config.toml              # Endpoint and retry configuration
//! ├── state.toml               # Anonymous session ids, theme, active session
//! ├── tokens.json              # Auth token triple (0600)
//! └── logs/                    # Application logs
//! ```

use std::path::PathBuf;

use leadline_core::error::{LeadlineError, Result};

/// Resolves the on-disk locations of leadline's client files.
#[derive(Debug, Clone)]
pub struct LeadlinePaths {
    base: PathBuf,
}

impl LeadlinePaths {
    /// Uses the platform config directory (e.g. `~/.config/leadline/`).
    pub fn new() -> Result<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| LeadlineError::config("Cannot find home directory"))?
            .join("leadline");
        Ok(Self { base })
    }

    /// Uses an explicit base directory (tests, portable installs).
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn config_dir(&self) -> &PathBuf {
        &self.base
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.toml")
    }

    pub fn state_file(&self) -> PathBuf {
        self.base.join("state.toml")
    }

    pub fn tokens_file(&self) -> PathBuf {
        self.base.join("tokens.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.base.join("logs")
    }
}
