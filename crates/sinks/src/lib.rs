//! trailpipe - Sinks
//!
//! Delivery of normalized audit records to a queueing backend.
//!
//! # Architecture
//!
//! The feed hands ordered batches of [`trailpipe_protocol::Record`] to a
//! [`BatchProcessor`]. The Redis sink encodes and serializes each record,
//! then appends the resulting messages to a Redis list over a pooled
//! connection, retrying transient failures with exponential backoff.
//!
//! ```text
//! [Feed] --&[Record]--> [RedisSink] --encode/serialize--> [ConnectionPool] --RPUSH--> [Redis]
//! ```
//!
//! # Available Sinks
//!
//! | Sink | Purpose |
//! |------|---------|
//! | `redis` | Logstash-compatible Redis list (RPUSH) |
//!
//! # Example
//!
//! ```ignore
//! use trailpipe_sinks::{BatchProcessor, RedisSink, RedisSinkConfig};
//!
//! let config = RedisSinkConfig::from_config(&config.redis)?;
//! let sink = Arc::new(RedisSink::new(config)?.with_cancellation(cancel.clone()));
//!
//! sink.process(&records).await?;
//! ```

/// Redis sink - Logstash-compatible list delivery
pub mod redis;

/// Types shared by the feed and every sink
mod common;

pub use common::{BatchProcessor, CallbackError};

pub use crate::redis::{
    BackendError, ConnectionHealth, ConnectionPool, Connector, PooledConnection, QueueConnection,
    RedisConnection, RedisConnector, RedisSink, RedisSinkConfig, RedisSinkError,
    RedisSinkMetricsHandle,
};
