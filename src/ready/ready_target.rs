//! ReadyTarget: wait until a monotonically advancing index reaches a target.
//!
//! Producers publish progress with [`ReadyTarget::signal`]; consumers call
//! [`ReadyTarget::subscribe`] with the index they need and await the
//! returned [`Subscription`]. Signals below the current index are ignored,
//! so racing producers can never roll progress back.

use std::future::Future;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::constants::READY_TARGET_COMPONENT;
use crate::Error;
use crate::Result;

/// Identifies a pending subscription for [`ReadyTarget::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber<T> {
    id: SubscriptionId,
    target: T,
    tx: oneshot::Sender<()>,
}

struct Inner<T> {
    current_target: T,
    subscribers: Vec<Subscriber<T>>,
    next_id: u64,
}

impl<T> Inner<T> {
    fn prune_dropped(&mut self) {
        self.subscribers.retain(|s| !s.tx.is_closed());
    }
}

pub struct ReadyTarget<T> {
    inner: Mutex<Inner<T>>,
}

impl<T> Default for ReadyTarget<T>
where T: Ord + Default
{
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                current_target: T::default(),
                subscribers: Vec::new(),
                next_id: 0,
            }),
        }
    }
}

impl<T> ReadyTarget<T>
where T: Ord + Default
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a subscription that resolves once the published index is at
    /// least `target`. Completes immediately if it already is.
    pub fn subscribe(
        &self,
        target: T,
    ) -> Subscription {
        let mut inner = self.inner.lock();
        inner.prune_dropped();
        inner.next_id += 1;
        let id = SubscriptionId(inner.next_id);

        if target <= inner.current_target {
            return Subscription { id, rx: None };
        }

        let (tx, rx) = oneshot::channel();
        inner.subscribers.push(Subscriber { id, target, tx });
        Subscription { id, rx: Some(rx) }
    }

    /// Removes a pending subscription without completing it. Awaiting it
    /// afterwards yields [`Error::Cancelled`].
    pub fn unsubscribe(
        &self,
        id: SubscriptionId,
    ) {
        let mut inner = self.inner.lock();
        inner.subscribers.retain(|s| s.id != id);
    }

    /// Advances the published index and releases every subscriber whose
    /// target has been reached. No-op unless `index` moves forward.
    pub fn signal(
        &self,
        index: T,
    ) {
        let released = {
            let mut inner = self.inner.lock();
            inner.prune_dropped();
            if index <= inner.current_target {
                return;
            }
            let (released, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut inner.subscribers)
                .into_iter()
                .partition(|s| s.target <= index);
            inner.subscribers = pending;
            inner.current_target = index;
            released
        };

        // Completion happens outside the lock
        for subscriber in released {
            let _ = subscriber.tx.send(());
        }
    }

    /// Clears the published index and drops every pending subscriber
    /// without completing it.
    pub fn reset(&self) {
        let dropped = {
            let mut inner = self.inner.lock();
            inner.current_target = T::default();
            std::mem::take(&mut inner.subscribers)
        };
        drop(dropped);
    }

    /// Subscribers still waiting. Subscriptions dropped without
    /// [`unsubscribe`](Self::unsubscribe) are discarded here and not counted.
    pub fn len(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.prune_dropped();
        inner.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> ReadyTarget<T>
where T: Ord + Default + Clone
{
    pub fn current(&self) -> T {
        self.inner.lock().current_target.clone()
    }
}

/// One-shot completion handle returned by [`ReadyTarget::subscribe`].
///
/// Dropping it abandons the wait. The target forgets a dropped
/// subscription lazily, on the next `subscribe`, `len` or `signal`.
#[must_use = "subscriptions do nothing unless awaited"]
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    rx: Option<oneshot::Receiver<()>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// True when the target was already reached at subscribe time.
    pub fn is_ready(&self) -> bool {
        self.rx.is_none()
    }
}

impl Future for Subscription {
    type Output = Result<()>;

    fn poll(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Self::Output> {
        let Some(rx) = self.rx.as_mut() else {
            return Poll::Ready(Ok(()));
        };
        match Pin::new(rx).poll(cx) {
            Poll::Ready(Ok(())) => {
                self.rx = None;
                Poll::Ready(Ok(()))
            }
            Poll::Ready(Err(_)) => Poll::Ready(Err(Error::Cancelled(READY_TARGET_COMPONENT))),
            Poll::Pending => Poll::Pending,
        }
    }
}
