use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::sleep_until;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::trace;

use super::flush_signal;
use super::BatchBuffer;
use super::FlushSignal;
use super::MergedBatch;
use super::QueuedFragment;
use crate::constants::QUEUE_COMPONENT;
use crate::utils::time::get_now_as_millis;
use crate::AtomicFlag;
use crate::AtomicMonotonicU64;
use crate::Error;
use crate::QueueConfig;
use crate::Result;

/// Point-in-time view of a [`Queue`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub depth: usize,
    pub batch_size: usize,
    pub max_pending: usize,
    pub timeout_ms: u64,
    pub last_sequence: u64,
}

/// State shared between the queue handle and its dispatcher.
struct QueueShared {
    closing: AtomicFlag,
    depth: AtomicUsize,
    last_sequence: AtomicMonotonicU64,
    flush: Notify,
    shutdown: CancellationToken,
}

pub struct Queue<T> {
    config: QueueConfig,
    shared: Arc<QueueShared>,
    tx: mpsc::Sender<QueuedFragment<T>>,
    // Last assigned sequence number. Held while a fragment enters the
    // channel, so channel order and sequence order agree.
    sequence: Mutex<u64>,
    dispatcher: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl<T> Queue<T>
where T: Send + 'static
{
    /// Starts a queue and its dispatcher. Must be called within a tokio
    /// runtime.
    ///
    /// `timeout` is used as given; [`QueueStats::timeout_ms`] reports it
    /// rounded up to whole milliseconds.
    pub fn new(
        max_pending: usize,
        batch_size: usize,
        timeout: Duration,
    ) -> Result<(Self, Batches<T>)> {
        let config = QueueConfig {
            max_pending,
            batch_size,
            timeout_ms: timeout.as_nanos().div_ceil(1_000_000) as u64,
        };
        config.validate()?;
        Ok(Self::start(config, timeout))
    }

    pub fn from_config(config: &QueueConfig) -> Result<(Self, Batches<T>)> {
        config.validate()?;
        Ok(Self::start(config.clone(), config.timeout()))
    }

    fn start(
        config: QueueConfig,
        timeout: Duration,
    ) -> (Self, Batches<T>) {
        let (tx, rx) = mpsc::channel(config.max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(QueueShared {
            closing: AtomicFlag::new(),
            depth: AtomicUsize::new(0),
            last_sequence: AtomicMonotonicU64::new(),
            flush: Notify::new(),
            shutdown: CancellationToken::new(),
        });

        let dispatcher = Dispatcher {
            shared: shared.clone(),
            rx,
            out_tx,
            buffer: BatchBuffer::new(config.batch_size, timeout),
        };
        let handle = tokio::spawn(dispatcher.run());

        let queue = Self {
            config,
            shared,
            tx,
            sequence: Mutex::new(get_now_as_millis()),
            dispatcher: tokio::sync::Mutex::new(Some(handle)),
        };
        (queue, Batches { rx: out_rx })
    }

    /// Submits `items` as one fragment and returns its sequence number once
    /// the fragment is accepted.
    ///
    /// Waits while `max_pending` fragments are already queued. `flush` is
    /// fired after the batch containing this fragment has been emitted.
    pub async fn write(
        &self,
        items: Vec<T>,
        flush: Option<FlushSignal>,
    ) -> Result<u64> {
        if self.shared.closing.is_set() {
            return Err(Error::Closed(QUEUE_COMPONENT));
        }

        let permit = self
            .tx
            .reserve()
            .await
            .map_err(|_| Error::Closed(QUEUE_COMPONENT))?;

        let sequence_number = {
            let mut sequence = self.sequence.lock();
            *sequence += 1;
            self.shared.depth.fetch_add(1, Ordering::AcqRel);
            permit.send(QueuedFragment {
                sequence_number: *sequence,
                items,
                flush,
            });
            *sequence
        };
        self.shared.last_sequence.store(sequence_number);
        Ok(sequence_number)
    }

    /// Writes `items` and waits until they have been emitted in a batch.
    /// Returns the sequence number of that batch.
    pub async fn write_and_wait(
        &self,
        items: Vec<T>,
    ) -> Result<u64> {
        let (signal, waiter) = flush_signal();
        self.write(items, Some(signal)).await?;
        waiter.wait().await
    }

    /// Asks the dispatcher to flush whatever has accumulated. Does not wait.
    pub fn flush(&self) {
        self.shared.flush.notify_one();
    }

    /// Stops accepting writes, flushes everything already accepted, fires
    /// the pending flush signals and closes the [`Batches`] stream.
    ///
    /// Returns only after the dispatcher has drained. Idempotent.
    pub async fn close(&self) {
        self.shared.closing.set();
        self.shared.shutdown.cancel();

        let mut dispatcher = self.dispatcher.lock().await;
        if let Some(handle) = dispatcher.take() {
            if let Err(e) = handle.await {
                error!("queue dispatcher failed while closing: {:?}", e);
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closing.is_set()
    }

    /// Fragments accepted but not yet merged. Approximate.
    pub fn depth(&self) -> usize {
        self.shared.depth.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            depth: self.depth(),
            batch_size: self.config.batch_size,
            max_pending: self.config.max_pending,
            timeout_ms: self.config.timeout_ms,
            last_sequence: self.shared.last_sequence.load(),
        }
    }
}

impl<T> Drop for Queue<T> {
    fn drop(&mut self) {
        // Dispatcher drains on its own; nobody is left to await it
        self.shared.shutdown.cancel();
    }
}

/// Receiving end of the merged batch stream. Ends after the queue closes.
#[derive(Debug)]
pub struct Batches<T> {
    rx: mpsc::UnboundedReceiver<MergedBatch<T>>,
}

impl<T> Batches<T> {
    pub async fn recv(&mut self) -> Option<MergedBatch<T>> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<MergedBatch<T>> {
        self.rx.try_recv().ok()
    }

    pub fn into_stream(self) -> UnboundedReceiverStream<MergedBatch<T>> {
        UnboundedReceiverStream::new(self.rx)
    }
}

#[derive(Debug, Clone, Copy)]
enum FlushReason {
    Size,
    Timeout,
    Explicit,
    Close,
}

/// Sole consumer of the fragment channel and sole producer of batches.
struct Dispatcher<T> {
    shared: Arc<QueueShared>,
    rx: mpsc::Receiver<QueuedFragment<T>>,
    out_tx: mpsc::UnboundedSender<MergedBatch<T>>,
    buffer: BatchBuffer<T>,
}

impl<T> Dispatcher<T>
where T: Send + 'static
{
    async fn run(mut self) {
        debug!("queue dispatcher started");
        let shutdown = self.shared.shutdown.clone();

        loop {
            let deadline = self.buffer.deadline();
            tokio::select! {
                // Use biased to ensure branch order
                biased;
                // P0: close requested
                _ = shutdown.cancelled() => break,

                // P1: new fragment
                fragment = self.rx.recv() => {
                    let Some(fragment) = fragment else {
                        // Every queue handle is gone
                        break;
                    };
                    self.shared.depth.fetch_sub(1, Ordering::AcqRel);
                    if self.buffer.push(fragment) {
                        self.flush(FlushReason::Size);
                    } else if self.buffer.is_expired() {
                        self.flush(FlushReason::Timeout);
                    }
                }

                // P2: explicit flush
                _ = self.shared.flush.notified() => self.flush(FlushReason::Explicit),

                // P3: timeout since last flush
                _ = sleep_until(deadline) => self.flush(FlushReason::Timeout),
            }
        }

        // Drain whatever was accepted before the channel closed
        self.rx.close();
        while let Some(fragment) = self.rx.recv().await {
            self.shared.depth.fetch_sub(1, Ordering::AcqRel);
            self.buffer.push(fragment);
        }
        if !self.buffer.is_empty() {
            debug!("flushing residual fragments on close");
        }
        self.flush(FlushReason::Close);
        debug!("queue dispatcher stopped");
    }

    fn flush(
        &mut self,
        reason: FlushReason,
    ) {
        let Some((batch, signals)) = self.buffer.take() else {
            return;
        };
        let sequence_number = batch.sequence_number;
        trace!(
            ?reason,
            sequence_number,
            items = batch.items.len(),
            fragments = batch.fragments,
            "emitting merged batch"
        );

        // Receiver may be gone; acknowledgements still go out
        let _ = self.out_tx.send(batch);
        for signal in signals {
            signal.fire(sequence_number);
        }
    }
}
