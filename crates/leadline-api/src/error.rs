//! Mapping transport-level failures onto the [`RemoteError`] taxonomy.

use leadline_core::session::gateway::RemoteError;

/// Maps a reqwest transport error. Connectivity loss and timeouts become
/// `Offline` (retryable); everything else is `Other`.
pub(crate) fn from_reqwest(err: reqwest::Error) -> RemoteError {
    if err.is_connect() || err.is_timeout() {
        RemoteError::Offline {
            message: err.to_string(),
        }
    } else {
        RemoteError::Other {
            message: err.to_string(),
        }
    }
}

/// Maps a malformed response body.
pub(crate) fn from_body(err: reqwest::Error) -> RemoteError {
    RemoteError::Other {
        message: format!("Malformed response body: {}", err),
    }
}

/// Converts a non-2xx response into the matching error variant, consuming
/// the body for the message.
pub(crate) async fn from_status(response: reqwest::Response) -> RemoteError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    match status {
        401 => RemoteError::Unauthorized,
        404 => RemoteError::NotFound,
        400..=499 => RemoteError::Client { status, message },
        500..=599 => RemoteError::Server { status, message },
        _ => RemoteError::Other { message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryability_of_mapped_classes() {
        // Offline and Server retry; the 4xx family does not.
        assert!(RemoteError::Offline {
            message: "connect error".into()
        }
        .is_retryable());
        assert!(RemoteError::Server {
            status: 502,
            message: "bad gateway".into()
        }
        .is_retryable());
        assert!(!RemoteError::Unauthorized.is_retryable());
        assert!(!RemoteError::NotFound.is_retryable());
    }
}
