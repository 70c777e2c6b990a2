use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use super::FlushSignal;

/// One submitter's items, prior to merging.
#[derive(Debug)]
pub(crate) struct QueuedFragment<T> {
    pub(crate) sequence_number: u64,
    pub(crate) items: Vec<T>,
    pub(crate) flush: Option<FlushSignal>,
}

/// Unit emitted downstream after a flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedBatch<T> {
    /// Highest sequence number among the merged fragments
    pub sequence_number: u64,
    /// Items of every fragment, concatenated in arrival order
    pub items: Vec<T>,
    /// Number of fragments merged into this batch
    pub fragments: usize,
}

/// Accumulation buffer owned by the dispatcher.
pub(crate) struct BatchBuffer<T> {
    pub(super) batch_size: usize,
    pub(super) timeout: Duration,
    pub(super) fragments: Vec<QueuedFragment<T>>,
    pub(super) item_count: usize,
    pub(super) last_flush: Instant,
}

impl<T> BatchBuffer<T> {
    pub(crate) fn new(
        batch_size: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            batch_size,
            timeout,
            fragments: Vec::new(),
            item_count: 0,
            last_flush: Instant::now(),
        }
    }

    /// Appends a fragment and reports whether a size-triggered flush is due.
    /// Only items count towards the batch size; fragments without items
    /// wait for the next timeout or explicit flush.
    pub(crate) fn push(
        &mut self,
        fragment: QueuedFragment<T>,
    ) -> bool {
        self.item_count += fragment.items.len();
        self.fragments.push(fragment);
        trace!(
            "BatchBuffer::push, batch_size={}, item_count={}, fragments={}",
            self.batch_size,
            self.item_count,
            self.fragments.len()
        );
        self.item_count >= self.batch_size
    }

    pub(crate) fn deadline(&self) -> Instant {
        self.last_flush + self.timeout
    }

    pub(crate) fn is_expired(&self) -> bool {
        self.deadline() <= Instant::now()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Merges everything accumulated and restarts the timeout window.
    /// Returns `None` when nothing was accumulated.
    pub(crate) fn take(&mut self) -> Option<(MergedBatch<T>, Vec<FlushSignal>)> {
        self.last_flush = Instant::now();
        if self.fragments.is_empty() {
            return None;
        }

        let fragments = std::mem::take(&mut self.fragments);
        let mut batch = MergedBatch {
            sequence_number: 0,
            items: Vec::with_capacity(self.item_count),
            fragments: fragments.len(),
        };
        self.item_count = 0;

        let mut signals = Vec::new();
        for fragment in fragments {
            batch.sequence_number = batch.sequence_number.max(fragment.sequence_number);
            batch.items.extend(fragment.items);
            if let Some(signal) = fragment.flush {
                signals.push(signal);
            }
        }
        Some((batch, signals))
    }
}
