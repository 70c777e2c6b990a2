#[cfg(test)]
use mockall::automock;

use crate::Result;

/// Opens new connections for a [`ConnPool`](crate::ConnPool).
///
/// Dropping a connection is how the pool destroys it.
#[cfg_attr(test, automock(type Conn = u64;))]
pub trait ConnectionFactory: Send + Sync + 'static {
    type Conn: Send + 'static;

    fn connect(&self) -> Result<Self::Conn>;
}

/// Adapts a closure into a [`ConnectionFactory`].
pub struct FnConnectionFactory<F> {
    f: F,
}

impl<F, C> FnConnectionFactory<F>
where
    F: Fn() -> Result<C> + Send + Sync + 'static,
    C: Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, C> ConnectionFactory for FnConnectionFactory<F>
where
    F: Fn() -> Result<C> + Send + Sync + 'static,
    C: Send + 'static,
{
    type Conn = C;

    fn connect(&self) -> Result<C> {
        (self.f)()
    }
}
