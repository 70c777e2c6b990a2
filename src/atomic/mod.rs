//! Thread-safe scalar holders used by the higher level primitives for
//! counters, timestamps, flags and labels.

mod atomic_value;
pub use atomic_value::*;
