use std::time::Duration;

use tokio::time::sleep;
use tokio::time::timeout;
use tracing::debug;
use tracing::warn;

use crate::BackoffPolicy;
use crate::Error;
use crate::Result;

/// Retries `task` with a per-attempt timeout and exponential backoff.
///
/// Only errors for which [`Error::is_retryable`] holds (and per-attempt
/// timeouts) are retried; anything else is returned immediately.
/// `max_retries == 0` retries until success or a permanent error.
pub async fn retry_with_backoff<F, T, P>(
    task: F,
    policy: BackoffPolicy,
) -> Result<P>
where
    F: Fn() -> T,
    T: std::future::Future<Output = Result<P>>,
{
    let attempt_timeout = Duration::from_millis(policy.timeout_ms);
    let max_delay = Duration::from_millis(policy.max_delay_ms);
    let mut delay = Duration::from_millis(policy.base_delay_ms);
    let mut attempts = 0;

    loop {
        let e = match timeout(attempt_timeout, task()).await {
            Ok(Ok(r)) => return Ok(r),
            Ok(Err(e)) if !e.is_retryable() => return Err(e),
            Ok(Err(e)) => e,
            Err(_) => Error::timeout("backoff attempt", attempt_timeout),
        };

        attempts += 1;
        if policy.max_retries != 0 && attempts >= policy.max_retries {
            warn!("task failed after {} attempts: {:?}", attempts, e);
            return Err(e);
        }

        debug!(attempts, ?delay, "retrying after error: {:?}", e);
        sleep(delay).await;
        delay = (delay * 2).min(max_delay);
    }
}
