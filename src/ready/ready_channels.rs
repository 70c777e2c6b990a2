use std::future::Future;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::trace;

use crate::utils::wait::poll_true;
use crate::Result;

/// Identifies a unit of work registered with [`ReadyChannels`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

/// Tracks a dynamic set of asynchronous tasks and reports whether all of
/// them have finished. Success and failure are not distinguished.
#[derive(Debug, Default)]
pub struct ReadyChannels {
    // Number of registered tasks. Guards the snapshot taken by `ready`.
    registered: Mutex<u64>,
    completed: Arc<AtomicUsize>,
}

impl ReadyChannels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `task` and spawns a watcher that counts its completion
    /// exactly once. A [`tokio::task::JoinHandle`] is accepted as-is.
    ///
    /// Must be called from within a tokio runtime.
    pub fn register<F>(
        &self,
        task: F,
    ) -> TaskId
    where
        F: Future + Send + 'static,
        F::Output: Send,
    {
        let id = {
            let mut registered = self.registered.lock();
            *registered += 1;
            TaskId(*registered)
        };

        let completed = self.completed.clone();
        tokio::spawn(async move {
            let _ = task.await;
            completed.fetch_add(1, Ordering::AcqRel);
            trace!(task_id = id.0, "registered task completed");
        });
        id
    }

    pub fn ready(&self) -> bool {
        let registered = self.registered.lock();
        self.completed.load(Ordering::Acquire) as u64 == *registered
    }

    pub fn registered(&self) -> usize {
        *self.registered.lock() as usize
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    /// Polls [`ready`](Self::ready) until it holds or `timeout` elapses.
    pub async fn wait_ready(
        &self,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<()> {
        poll_true("ready channels", poll_interval, timeout, || self.ready()).await
    }
}
