//! Deadline-bounded waiting helpers.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tokio::time::Instant;

use crate::Error;
use crate::Result;

/// Evaluates `f` immediately and then every `poll_interval` until it
/// returns true, failing with [`Error::Timeout`] once `timeout` has elapsed.
pub async fn poll_true<F>(
    name: &str,
    poll_interval: Duration,
    timeout: Duration,
    mut f: F,
) -> Result<()>
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    if f() {
        return Ok(());
    }
    while start.elapsed() < timeout {
        sleep(poll_interval).await;
        if f() {
            return Ok(());
        }
    }
    Err(Error::timeout(format!("waiting for {name}"), timeout))
}

/// Awaits `fut` with an overall deadline. The future's own error is
/// propagated as-is; expiry yields [`Error::Timeout`] and drops `fut`.
pub async fn with_timeout<F, T>(
    name: &str,
    timeout: Duration,
    fut: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(r) => r,
        Err(_) => Err(Error::timeout(name, timeout)),
    }
}
