//! Coordination and resource-pooling primitives for replication, backup
//! and connection handling.
//!
//! - [`Queue`]: adaptive batching of concurrently submitted fragments
//! - [`ConnPool`]: bounded pool over a pluggable [`ConnectionFactory`]
//! - [`MultiRSW`] and [`CheckAndSet`]: non-blocking admission gates
//! - [`ReadyTarget`] and [`ReadyChannels`]: readiness barriers
//! - atomic holders for counters, timestamps, flags and strings

mod atomic;
mod config;
mod constants;
mod errors;
mod gate;
mod metrics;
mod pool;
mod queue;
mod ready;
pub mod utils;

pub use atomic::*;
pub use config::*;
pub use errors::*;
pub use gate::*;
pub use metrics::*;
pub use pool::*;
pub use queue::*;
pub use ready::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
