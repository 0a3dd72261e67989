//! Backend connection traits and the Redis implementation
//!
//! The sink and pool only see [`Connector`] and [`QueueConnection`], so the
//! retry and eviction logic can be exercised against an in-memory backend.

use std::time::Duration;

use ::redis::aio::MultiplexedConnection;
use ::redis::{Client, RedisError, RedisResult};
use async_trait::async_trait;
use tokio::time::timeout;
use trailpipe_protocol::WireMessage;

use super::error::{BackendError, RedisSinkError};

/// An open connection to a list-queue backend
#[async_trait]
pub trait QueueConnection: Send {
    /// Append `messages` to the tail of the list at `key` in one command
    ///
    /// Returns the list length after the push.
    async fn append(&mut self, key: &str, messages: &[WireMessage]) -> Result<u64, BackendError>;
}

/// Factory for backend connections
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Connection type produced by this connector
    type Connection: QueueConnection + 'static;

    /// Open a new connection
    async fn connect(&self) -> Result<Self::Connection, BackendError>;
}

/// Connector for a Redis server
#[derive(Debug, Clone)]
pub struct RedisConnector {
    client: Client,
    connection_timeout: Duration,
    write_timeout: Duration,
}

impl RedisConnector {
    /// Create a connector for `uri`
    ///
    /// No connection is opened until the first write.
    ///
    /// # Errors
    ///
    /// Returns error if the URI cannot be parsed.
    pub fn new(
        uri: &str,
        connection_timeout: Duration,
        write_timeout: Duration,
    ) -> Result<Self, RedisSinkError> {
        let client = Client::open(uri)
            .map_err(|e| RedisSinkError::config(format!("invalid redis uri '{uri}': {e}")))?;

        Ok(Self {
            client,
            connection_timeout,
            write_timeout,
        })
    }
}

#[async_trait]
impl Connector for RedisConnector {
    type Connection = RedisConnection;

    async fn connect(&self) -> Result<RedisConnection, BackendError> {
        match timeout(
            self.connection_timeout,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        {
            Ok(Ok(conn)) => Ok(RedisConnection {
                conn,
                write_timeout: self.write_timeout,
            }),
            // Any failure to establish a connection is worth retrying
            Ok(Err(e)) => Err(BackendError::connection(e.to_string())),
            Err(_) => Err(BackendError::Timeout),
        }
    }
}

/// A single multiplexed Redis connection
pub struct RedisConnection {
    conn: MultiplexedConnection,
    write_timeout: Duration,
}

#[async_trait]
impl QueueConnection for RedisConnection {
    async fn append(&mut self, key: &str, messages: &[WireMessage]) -> Result<u64, BackendError> {
        let mut cmd = ::redis::cmd("RPUSH");
        cmd.arg(key);
        for message in messages {
            cmd.arg(message.as_str());
        }

        let result: Result<RedisResult<u64>, _> =
            timeout(self.write_timeout, cmd.query_async(&mut self.conn)).await;

        match result {
            Ok(Ok(len)) => Ok(len),
            Ok(Err(e)) => Err(classify(&e)),
            Err(_) => Err(BackendError::Timeout),
        }
    }
}

/// Map a client error onto the retry classification
fn classify(err: &RedisError) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
        BackendError::connection(err.to_string())
    } else {
        BackendError::response(err.to_string())
    }
}
