//! Adaptive batching queue.
//!
//! Producers submit fragments with [`Queue::write`]. A single background
//! dispatcher merges accumulated fragments into a [`MergedBatch`] when the
//! item count reaches the batch size, when the flush timeout expires, or
//! when [`Queue::flush`] is requested, and emits batches in order on the
//! [`Batches`] receiver.
//!
//! ```text
//! write() ──► bounded mpsc (max_pending) ──► dispatcher ──► Batches
//!                                              │
//!                                              └──► flush signals fired
//! ```

mod batch;
mod flush;
mod queue;
pub use batch::*;
pub use flush::*;
pub use queue::*;
