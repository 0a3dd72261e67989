//! Redis Sink - Logstash-compatible list delivery
//!
//! Encodes each record into a Logstash event, serializes it to JSON, and
//! appends it to a Redis list with `RPUSH`. Logstash's `redis` input (or
//! any list consumer) pops events from the same key.
//!
//! # Write modes
//!
//! - **batch**: every serializable record of a batch is pushed in a single
//!   `RPUSH`. The write is retried or failed as a unit. An empty result
//!   makes no backend call.
//! - **serial** (default): only the first record that serializes is
//!   pushed, and the rest of the batch is not processed. Upstream feeds
//!   that rely on one-record-per-call delivery depend on this behavior, so
//!   use `batch` when every record must be delivered.
//!
//! # Retries
//!
//! Connection failures and timeouts are retried up to `max_attempts` times
//! in total. The delay before attempt `i + 1` is exactly `2^i` seconds
//! (1s, 2s, 4s, 8s, ...). Error replies from the server are never retried.
//! A connection that failed is evicted from the pool before the delay.
//!
//! ```text
//! Attempting(i) ──ok──────────────────────────────► Done
//!      │
//!      ├─ error reply ───────────────────────────► Rejected
//!      │
//!      └─ connection/timeout ─┬─ i + 1 < max ─ sleep 2^i s ─► Attempting(i + 1)
//!                             │                   └─ cancelled ─► Interrupted
//!                             └─ i + 1 == max ─────────────────► DeliveryExhausted
//! ```

mod backend;
mod config;
mod error;
mod metrics;
mod pool;
mod sink;

pub use backend::{Connector, QueueConnection, RedisConnection, RedisConnector};
pub use config::RedisSinkConfig;
pub use error::{BackendError, RedisSinkError};
pub use metrics::RedisSinkMetricsHandle;
pub use pool::{ConnectionHealth, ConnectionPool, PooledConnection};
pub use sink::{RedisSink, backoff_delay};

#[cfg(test)]
mod test_support;
