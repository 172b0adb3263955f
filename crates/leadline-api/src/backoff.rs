//! Bounded exponential backoff around remote calls.

use std::future::Future;

use leadline_core::config::RetryPolicy;
use leadline_core::session::gateway::RemoteError;

/// Runs `op` up to `policy.max_attempts` times, sleeping between attempts
/// with doubling delays. Only retryable errors (connectivity, 5xx) are
/// retried; the rest return immediately. The closure receives the 1-based
/// attempt number.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, RemoteError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < policy.max_attempts => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    "[Backoff] {} attempt {}/{} failed ({}); retrying in {:?}",
                    label,
                    attempt,
                    policy.max_attempts,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                tracing::warn!(
                    "[Backoff] {} failed after {} attempt(s): {}",
                    label,
                    attempt,
                    err
                );
                return Err(err);
            }
        }
    }
}
