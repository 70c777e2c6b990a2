//! Coordination Primitive Error Hierarchy
//!
//! Errors are grouped by how a caller is expected to react:
//! contention may be retried, closure is permanent, and consistency
//! failures point at a caller bug.

use std::time::Duration;

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Admission gate or check-and-set contention. Caller may retry.
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// Retry budget or overall deadline exhausted
    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: String, after: Duration },

    /// Operation attempted after shutdown. Never retryable.
    #[error("{0} is closed")]
    Closed(&'static str),

    /// Pool at capacity with no idle resource
    #[error("pool exhausted: all {capacity} connections are in use")]
    Exhausted { capacity: usize },

    /// A pending wait was dropped without being completed
    #[error("{0} was cancelled before completion")]
    Cancelled(&'static str),

    /// Internal bookkeeping violated; indicates a caller bug
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    /// Connection factory failed to produce a resource
    #[error("failed to open connection: {0}")]
    Connect(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Metric registration or encoding failures
    #[error(transparent)]
    Metrics(#[from] prometheus::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConflictError {
    /// A reader is blocked by an active writer, or a writer by any activity
    #[error("multiple-reader/single-writer conflict")]
    ReaderWriter,

    /// Upgrade requested while no read was in progress
    #[error("upgrade attempted with no active readers")]
    UpgradeWithoutReaders,

    /// Check-and-set already held
    #[error("check-and-set conflict: currently held by owner \"{owner}\" for {held_for:?}")]
    Held { owner: String, held_for: Duration },
}

#[derive(Debug, thiserror::Error)]
pub enum ConsistencyError {
    #[error("reader count went negative")]
    NegativeReaderCount,

    #[error("write done received but no write is active")]
    NoActiveWriter,
}

impl Error {
    /// Whether the caller may sensibly try the same operation again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Conflict(_) | Error::Exhausted { .. } | Error::Connect(_)
        )
    }

    pub(crate) fn timeout(
        operation: impl Into<String>,
        after: Duration,
    ) -> Self {
        Error::Timeout {
            operation: operation.into(),
            after,
        }
    }
}
