//! Error types for the Leadline application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Leadline application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum LeadlineError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote API error (session store, lead intake, auth provider)
    #[error("API error: {0}")]
    Api(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LeadlineError {
    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Api error
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<std::io::Error> for LeadlineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for LeadlineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for LeadlineError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for LeadlineError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, LeadlineError>`.
pub type Result<T> = std::result::Result<T, LeadlineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_helpers_pick_the_right_variant() {
        assert!(matches!(LeadlineError::io("disk full"), LeadlineError::Io { .. }));
        assert!(matches!(
            LeadlineError::config("bad url"),
            LeadlineError::Config(_)
        ));
        assert!(matches!(
            LeadlineError::api("503 from upstream"),
            LeadlineError::Api(_)
        ));
        assert!(matches!(
            LeadlineError::internal("poisoned lock"),
            LeadlineError::Internal(_)
        ));
    }

    #[test]
    fn test_io_errors_convert_with_kind() {
        let err: LeadlineError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(err.to_string().contains("NotFound"));
    }

    #[test]
    fn test_serde_errors_carry_their_format() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: LeadlineError = json_err.into();
        assert!(err.to_string().contains("JSON"));

        let toml_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let err: LeadlineError = toml_err.into();
        assert!(err.to_string().contains("TOML"));
    }
}
