use std::collections::VecDeque;
use std::ops::Deref;
use std::ops::DerefMut;
use std::sync::Arc;

use config::ConfigError;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;
use tracing::trace;

use super::ConnectionFactory;
use crate::constants::POOL_COMPONENT;
use crate::utils::backoff::retry_with_backoff;
use crate::BackoffPolicy;
use crate::Error;
use crate::PoolConfig;
use crate::Result;

/// Point-in-time view of a [`ConnPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub idle: usize,
    pub open: usize,
    pub max_capacity: usize,
}

struct PoolState<C> {
    idle: VecDeque<C>,
    // Connections created and not yet destroyed, idle or lent out
    open: usize,
    closed: bool,
}

struct PoolShared<F: ConnectionFactory> {
    factory: F,
    max_capacity: usize,
    state: Mutex<PoolState<F::Conn>>,
}

/// Cloneable handle to a bounded connection pool.
pub struct ConnPool<F: ConnectionFactory> {
    shared: Arc<PoolShared<F>>,
}

impl<F: ConnectionFactory> Clone for ConnPool<F> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<F: ConnectionFactory> ConnPool<F> {
    pub fn new(
        max_capacity: usize,
        factory: F,
    ) -> Result<Self> {
        if max_capacity == 0 {
            return Err(Error::Config(ConfigError::Message(
                "pool capacity must be greater than 0".into(),
            )));
        }
        Ok(Self {
            shared: Arc::new(PoolShared {
                factory,
                max_capacity,
                state: Mutex::new(PoolState {
                    idle: VecDeque::with_capacity(max_capacity),
                    open: 0,
                    closed: false,
                }),
            }),
        })
    }

    pub fn from_config(
        config: &PoolConfig,
        factory: F,
    ) -> Result<Self> {
        Self::new(config.max_capacity, factory)
    }

    /// Hands out an idle connection, or opens a new one while below
    /// capacity. Never waits.
    pub fn get(&self) -> Result<PooledConnection<F>> {
        {
            let mut state = self.shared.state.lock();
            if state.closed {
                return Err(Error::Closed(POOL_COMPONENT));
            }
            if let Some(conn) = state.idle.pop_front() {
                return Ok(self.wrap(conn));
            }
            if state.open >= self.shared.max_capacity {
                return Err(Error::Exhausted {
                    capacity: self.shared.max_capacity,
                });
            }
            // Reserve the slot so concurrent callers cannot overshoot
            state.open += 1;
        }

        match self.shared.factory.connect() {
            Ok(conn) => {
                debug!("opened pooled connection");
                Ok(self.wrap(conn))
            }
            Err(e) => {
                self.shared.release_slot();
                Err(match e {
                    Error::Connect(_) => e,
                    other => Error::Connect(Box::new(other)),
                })
            }
        }
    }

    /// Layers `policy` over [`get`](Self::get), retrying while the pool is
    /// exhausted or the factory fails transiently.
    pub async fn get_with_backoff(
        &self,
        policy: BackoffPolicy,
    ) -> Result<PooledConnection<F>> {
        let pool = self;
        retry_with_backoff(move || async move { pool.get() }, policy).await
    }

    /// Marks the pool closed and destroys idle connections. Lent
    /// connections are destroyed when their guards drop. Idempotent.
    pub fn close(&self) {
        let drained = {
            let mut state = self.shared.state.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            state.open = 0;
            std::mem::take(&mut state.idle)
        };
        debug!(idle = drained.len(), "connection pool closed");
        drop(drained);
    }

    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    /// Number of idle connections.
    pub fn len(&self) -> usize {
        self.shared.state.lock().idle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> PoolStats {
        let state = self.shared.state.lock();
        PoolStats {
            idle: state.idle.len(),
            open: state.open,
            max_capacity: self.shared.max_capacity,
        }
    }

    fn wrap(
        &self,
        conn: F::Conn,
    ) -> PooledConnection<F> {
        PooledConnection {
            conn: Some(conn),
            unusable: false,
            pool: self.shared.clone(),
        }
    }
}

impl<F: ConnectionFactory> PoolShared<F> {
    fn release_slot(&self) {
        let mut state = self.state.lock();
        // A close in between already zeroed the counter
        state.open = state.open.saturating_sub(1);
    }

    fn put_back(
        &self,
        conn: F::Conn,
        unusable: bool,
    ) {
        let discarded = {
            let mut state = self.state.lock();
            if !unusable && !state.closed && state.idle.len() < self.max_capacity {
                state.idle.push_back(conn);
                None
            } else {
                state.open = state.open.saturating_sub(1);
                Some(conn)
            }
        };
        if let Some(conn) = discarded {
            trace!(unusable, "discarding pooled connection");
            drop(conn);
        }
    }
}

/// A connection lent out by a [`ConnPool`].
///
/// Dropping the guard returns the connection to the pool unless it was
/// marked unusable or the pool has closed, in which case it is destroyed.
pub struct PooledConnection<F: ConnectionFactory> {
    conn: Option<F::Conn>,
    unusable: bool,
    pool: Arc<PoolShared<F>>,
}

impl<F: ConnectionFactory> PooledConnection<F> {
    /// Flags the connection as broken so release destroys it.
    pub fn mark_unusable(&mut self) {
        self.unusable = true;
    }

    pub fn is_unusable(&self) -> bool {
        self.unusable
    }

    /// Explicit form of dropping the guard.
    pub fn release(self) {
        drop(self);
    }
}

impl<F: ConnectionFactory> Deref for PooledConnection<F> {
    type Target = F::Conn;

    fn deref(&self) -> &F::Conn {
        self.conn.as_ref().expect("connection present until release")
    }
}

impl<F: ConnectionFactory> DerefMut for PooledConnection<F> {
    fn deref_mut(&mut self) -> &mut F::Conn {
        self.conn.as_mut().expect("connection present until release")
    }
}

impl<F: ConnectionFactory> Drop for PooledConnection<F> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.put_back(conn, self.unusable);
        }
    }
}
