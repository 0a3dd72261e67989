//! Connection pool
//!
//! Bounds the number of connections checked out at once and keeps healthy
//! connections for reuse. Every acquired connection is released exactly
//! once, either explicitly with a health verdict or on drop.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::backend::{Connector, QueueConnection};
use super::error::BackendError;
use trailpipe_protocol::WireMessage;

/// Verdict passed when returning a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionHealth {
    /// Connection can be reused
    Healthy,
    /// Connection failed and must be discarded
    Broken,
}

struct PoolInner<C: Connector> {
    connector: C,
    idle: Mutex<Vec<C::Connection>>,
    permits: Arc<Semaphore>,
    max_size: usize,
    outstanding: AtomicUsize,
    evicted: AtomicU64,
}

/// Bounded pool of backend connections
///
/// Cloning is cheap and shares the same pool.
pub struct ConnectionPool<C: Connector> {
    inner: Arc<PoolInner<C>>,
}

impl<C: Connector> Clone for ConnectionPool<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Connector> ConnectionPool<C> {
    /// Create a pool allowing at most `max_size` checked-out connections
    ///
    /// A `max_size` of zero is treated as one.
    pub fn new(connector: C, max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            inner: Arc::new(PoolInner {
                connector,
                idle: Mutex::new(Vec::with_capacity(max_size)),
                permits: Arc::new(Semaphore::new(max_size)),
                max_size,
                outstanding: AtomicUsize::new(0),
                evicted: AtomicU64::new(0),
            }),
        }
    }

    /// Check out a connection, reusing an idle one when available
    ///
    /// Waits while `max_size` connections are already checked out.
    ///
    /// # Errors
    ///
    /// Returns the connector's error if a new connection cannot be opened.
    /// No slot is held after an error.
    pub async fn acquire(&self) -> Result<PooledConnection<C>, BackendError> {
        let permit = Arc::clone(&self.inner.permits)
            .acquire_owned()
            .await
            .map_err(|_| BackendError::connection("connection pool closed"))?;

        let reused = self.inner.idle.lock().pop();
        let conn = match reused {
            Some(conn) => conn,
            None => self.inner.connector.connect().await?,
        };

        self.inner.outstanding.fetch_add(1, Ordering::AcqRel);

        Ok(PooledConnection {
            conn: Some(conn),
            permit: Some(permit),
            pool: Arc::clone(&self.inner),
        })
    }

    /// Connections currently checked out
    pub fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::Acquire)
    }

    /// Connections waiting for reuse
    pub fn idle(&self) -> usize {
        self.inner.idle.lock().len()
    }

    /// Connections discarded as broken since creation
    pub fn evicted(&self) -> u64 {
        self.inner.evicted.load(Ordering::Relaxed)
    }

    /// Maximum concurrently checked-out connections
    pub fn max_size(&self) -> usize {
        self.inner.max_size
    }

    /// Drop every idle connection
    pub fn clear(&self) {
        self.inner.idle.lock().clear();
    }
}

/// A checked-out connection
///
/// Call [`release`](Self::release) with the outcome of the last command.
/// Dropping an unreleased connection releases it as broken, since the
/// state of an interrupted command is unknown.
pub struct PooledConnection<C: Connector> {
    conn: Option<C::Connection>,
    permit: Option<OwnedSemaphorePermit>,
    pool: Arc<PoolInner<C>>,
}

impl<C: Connector> PooledConnection<C> {
    /// Append messages over this connection
    ///
    /// # Errors
    ///
    /// Returns the backend error, or a connection error if the connection
    /// was already released.
    pub async fn append(
        &mut self,
        key: &str,
        messages: &[WireMessage],
    ) -> Result<u64, BackendError> {
        match self.conn.as_mut() {
            Some(conn) => conn.append(key, messages).await,
            None => Err(BackendError::connection("connection already released")),
        }
    }

    /// Whether the connection has been returned to the pool
    pub fn is_released(&self) -> bool {
        self.conn.is_none()
    }

    /// Return the connection to the pool
    ///
    /// Healthy connections are kept for reuse; broken ones are closed.
    /// Only the first call has an effect.
    pub fn release(&mut self, health: ConnectionHealth) {
        let Some(conn) = self.conn.take() else {
            return;
        };

        match health {
            ConnectionHealth::Healthy => {
                let mut idle = self.pool.idle.lock();
                if idle.len() < self.pool.max_size {
                    idle.push(conn);
                }
            }
            ConnectionHealth::Broken => {
                drop(conn);
                self.pool.evicted.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("evicted broken connection from pool");
            }
        }

        self.pool.outstanding.fetch_sub(1, Ordering::AcqRel);
        // slot frees only after the connection is back in the idle list
        self.permit.take();
    }
}

impl<C: Connector> Drop for PooledConnection<C> {
    fn drop(&mut self) {
        self.release(ConnectionHealth::Broken);
    }
}
