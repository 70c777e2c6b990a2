use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Batching queue parameters
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QueueConfig {
    /// Bound on fragments accepted but not yet merged; writers wait beyond it
    #[serde(default = "default_max_pending")]
    pub max_pending: usize,

    /// Accumulated item count that triggers a flush
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum time between flushes (unit: milliseconds)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_pending: default_max_pending(),
            batch_size: default_batch_size(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl QueueConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_pending == 0 {
            return Err(Error::Config(ConfigError::Message(
                "queue.max_pending must be greater than 0".into(),
            )));
        }
        if self.batch_size == 0 {
            return Err(Error::Config(ConfigError::Message(
                "queue.batch_size must be greater than 0".into(),
            )));
        }
        if self.timeout_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "queue.timeout_ms must be at least 1ms".into(),
            )));
        }
        Ok(())
    }
}

fn default_max_pending() -> usize {
    1024
}
fn default_batch_size() -> usize {
    128
}
fn default_timeout_ms() -> u64 {
    50
}
