//! CheckAndSet: a single-holder advisory lock with named ownership.
//!
//! Acquisition never queues. [`CheckAndSet::begin`] fails immediately when
//! the lock is held, reporting who holds it and for how long, and
//! [`CheckAndSet::begin_with_retry`] layers a bounded polling loop on top.
//!
//! Release is unchecked: [`CheckAndSet::end`] clears whatever owner is
//! recorded, regardless of who calls it.

use std::time::Duration;
use std::time::Instant;

use parking_lot::Mutex;
use serde::Serialize;

use crate::CasRetryConfig;
use crate::ConflictError;
use crate::Error;
use crate::Result;

#[derive(Debug)]
struct OwnerRecord {
    owner: String,
    start_time: Instant,
}

/// Point-in-time view of a [`CheckAndSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CasStats {
    pub owner: Option<String>,
    pub held_for: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct CheckAndSet {
    // `None` means released: no owner name, no start time.
    state: Mutex<Option<OwnerRecord>>,
}

impl CheckAndSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(
        &self,
        owner: &str,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(record) = state.as_ref() {
            return Err(ConflictError::Held {
                owner: record.owner.clone(),
                held_for: record.start_time.elapsed(),
            }
            .into());
        }
        *state = Some(OwnerRecord {
            owner: owner.to_string(),
            start_time: Instant::now(),
        });
        Ok(())
    }

    /// Retries [`begin`](Self::begin) every `retry_interval` until it
    /// succeeds or `timeout` has elapsed since the call started.
    ///
    /// The internal lock is never held while sleeping. On timeout the lock
    /// has not been acquired.
    pub async fn begin_with_retry(
        &self,
        owner: &str,
        timeout: Duration,
        retry_interval: Duration,
    ) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match self.begin(owner) {
                Ok(()) => return Ok(()),
                Err(Error::Conflict(_)) => {
                    let now = tokio::time::Instant::now();
                    if now >= deadline {
                        return Err(Error::timeout(format!("check-and-set for \"{owner}\""), timeout));
                    }
                    // Last attempt lands on the deadline, never past it
                    tokio::time::sleep(retry_interval.min(deadline - now)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn begin_with_policy(
        &self,
        owner: &str,
        policy: &CasRetryConfig,
    ) -> Result<()> {
        self.begin_with_retry(
            owner,
            Duration::from_millis(policy.timeout_ms),
            Duration::from_millis(policy.retry_interval_ms),
        )
        .await
    }

    /// Acquires the lock and releases it when the returned guard drops.
    pub fn guard(
        &self,
        owner: &str,
    ) -> Result<CasGuard<'_>> {
        self.begin(owner)?;
        Ok(CasGuard { cas: self })
    }

    /// Clears ownership unconditionally, without checking the caller is the
    /// recorded owner.
    pub fn end(&self) {
        *self.state.lock() = None;
    }

    /// Current holder, or an empty string when released.
    pub fn owner(&self) -> String {
        self.state
            .lock()
            .as_ref()
            .map(|r| r.owner.clone())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> CasStats {
        let state = self.state.lock();
        match state.as_ref() {
            Some(record) => CasStats {
                owner: Some(record.owner.clone()),
                held_for: Some(record.start_time.elapsed()),
            },
            None => CasStats {
                owner: None,
                held_for: None,
            },
        }
    }
}

/// RAII release for [`CheckAndSet`]
pub struct CasGuard<'a> {
    cas: &'a CheckAndSet,
}

impl Drop for CasGuard<'_> {
    fn drop(&mut self) {
        self.cas.end();
    }
}
