//! Bounded pool of reusable connections.
//!
//! Connections are created lazily up to the pool's capacity and handed out
//! as [`PooledConnection`] guards. Dropping a guard either returns the
//! connection to the idle queue or discards it. The pool never waits for
//! capacity: [`ConnPool::get`] fails fast with
//! [`Error::Exhausted`](crate::Error::Exhausted).

mod conn_pool;
mod factory;
pub use conn_pool::*;
pub use factory::*;
