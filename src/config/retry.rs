use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Basic retry policy template
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct BackoffPolicy {
    /// Maximum number of attempts (0 means unlimited retries)
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Single operation timeout (unit: milliseconds)
    #[serde(default = "default_op_timeout_ms")]
    pub timeout_ms: u64,

    /// Backoff base (unit: milliseconds)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Maximum backoff time (unit: milliseconds)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            timeout_ms: default_op_timeout_ms(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl BackoffPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "backoff timeout_ms must be at least 1ms".into(),
            )));
        }
        if self.base_delay_ms > self.max_delay_ms {
            return Err(Error::Config(ConfigError::Message(format!(
                "backoff base_delay_ms({}) must not exceed max_delay_ms({})",
                self.base_delay_ms, self.max_delay_ms
            ))));
        }
        Ok(())
    }
}

/// Fixed-interval retry for check-and-set acquisition
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct CasRetryConfig {
    /// Overall acquisition deadline (unit: milliseconds)
    #[serde(default = "default_cas_timeout_ms")]
    pub timeout_ms: u64,

    /// Sleep between attempts (unit: milliseconds)
    #[serde(default = "default_cas_retry_interval_ms")]
    pub retry_interval_ms: u64,
}

impl Default for CasRetryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_cas_timeout_ms(),
            retry_interval_ms: default_cas_retry_interval_ms(),
        }
    }
}

impl CasRetryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.retry_interval_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "retry.cas.retry_interval_ms must be at least 1ms".into(),
            )));
        }
        Ok(())
    }
}

/// Divide strategies by primitive
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RetryPolicies {
    // Check-and-set acquisition (e.g. exclusive backup upload)
    #[serde(default)]
    pub cas: CasRetryConfig,

    // Pool acquisition when exhausted
    #[serde(default)]
    pub pool: BackoffPolicy,
}

impl RetryPolicies {
    pub fn validate(&self) -> Result<()> {
        self.cas.validate()?;
        self.pool.validate()
    }
}

fn default_max_retries() -> usize {
    3
}
fn default_op_timeout_ms() -> u64 {
    100
}
fn default_base_delay_ms() -> u64 {
    50
}
fn default_max_delay_ms() -> u64 {
    1000
}
fn default_cas_timeout_ms() -> u64 {
    5000
}
fn default_cas_retry_interval_ms() -> u64 {
    100
}
