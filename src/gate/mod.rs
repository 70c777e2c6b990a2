//! Fail-fast admission gates.
//!
//! Neither gate ever queues a caller: contention is reported immediately as
//! [`ConflictError`](crate::ConflictError) and the retry policy is left to
//! the caller.

mod check_and_set;
mod multi_rsw;
pub use check_and_set::*;
pub use multi_rsw::*;

#[cfg(test)]
mod multi_rsw_test;
