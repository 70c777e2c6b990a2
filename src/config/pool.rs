use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Connection pool parameters
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PoolConfig {
    /// Maximum number of simultaneously open connections
    #[serde(default = "default_max_capacity")]
    pub max_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_capacity == 0 {
            return Err(Error::Config(ConfigError::Message(
                "pool.max_capacity must be greater than 0".into(),
            )));
        }
        Ok(())
    }
}

fn default_max_capacity() -> usize {
    8
}
