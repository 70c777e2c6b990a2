//! Readiness tracking: a monotonic-threshold barrier ([`ReadyTarget`]) and
//! an aggregate completion tracker ([`ReadyChannels`]).

mod ready_channels;
mod ready_target;
pub use ready_channels::*;
pub use ready_target::*;

#[cfg(test)]
mod ready_target_test;
