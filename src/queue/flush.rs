use tokio::sync::oneshot;

use crate::constants::FLUSH_SIGNAL_COMPONENT;
use crate::Error;
use crate::Result;

/// Sending half of a flush acknowledgement, attached to a write.
#[derive(Debug)]
pub struct FlushSignal {
    tx: oneshot::Sender<u64>,
}

/// Resolves once the write carrying the matching [`FlushSignal`] has been
/// merged and emitted.
#[derive(Debug)]
pub struct FlushWaiter {
    rx: oneshot::Receiver<u64>,
}

pub fn flush_signal() -> (FlushSignal, FlushWaiter) {
    let (tx, rx) = oneshot::channel();
    (FlushSignal { tx }, FlushWaiter { rx })
}

impl FlushSignal {
    pub(crate) fn fire(
        self,
        sequence_number: u64,
    ) {
        // Waiter may have given up already
        let _ = self.tx.send(sequence_number);
    }
}

impl FlushWaiter {
    /// Returns the sequence number of the batch the write was merged into.
    pub async fn wait(self) -> Result<u64> {
        self.rx
            .await
            .map_err(|_| Error::Cancelled(FLUSH_SIGNAL_COMPONENT))
    }
}
