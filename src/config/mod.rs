//! Configuration for the coordination primitives.
//!
//! Loading order (later sources override earlier):
//! 1. Default values (hardcoded)
//! 2. Config file named by `CONFIG_PATH`
//! 3. Environment variables with the `SYNC__` prefix (highest priority)
//!

mod pool;
mod queue;
mod retry;
pub use pool::*;
pub use queue::*;
pub use retry::*;

#[cfg(test)]
mod config_test;

//---
use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

const ENV_PREFIX: &str = "SYNC";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SyncConfig {
    /// Batching queue sizing and flush triggers
    #[serde(default)]
    pub queue: QueueConfig,
    /// Connection pool capacity
    #[serde(default)]
    pub pool: PoolConfig,
    /// Retry policies for check-and-set and pool acquisition
    #[serde(default)]
    pub retry: RetryPolicies,
}

impl SyncConfig {
    /// Builds configuration from defaults, the optional `CONFIG_PATH` file
    /// and `SYNC__*` environment variables.
    ///
    /// Does not validate; call [`validate`](Self::validate) once all
    /// overrides are applied.
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        let config: Self = builder.add_source(env_source()).build()?.try_deserialize()?;
        Ok(config)
    }

    /// Layers `path` over the current values, then the environment again.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    pub fn validate(self) -> Result<Self> {
        self.queue.validate()?;
        self.pool.validate()?;
        self.retry.validate()?;
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}
