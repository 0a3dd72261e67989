//! Redis sink
//!
//! Encode, serialize, and push record batches with bounded retries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use trailpipe_config::WriteMode;
use trailpipe_metrics::{SinkMetrics, SinkMetricsConfig, SinkMetricsSnapshot};
use trailpipe_protocol::{JsonSerializer, LogstashEncoder, Record, WireMessage};

use super::backend::{Connector, RedisConnector};
use super::config::RedisSinkConfig;
use super::error::{BackendError, RedisSinkError};
use super::metrics::RedisSinkMetricsHandle;
use super::pool::{ConnectionHealth, ConnectionPool};
use crate::common::{BatchProcessor, CallbackError};

/// Delay before attempt `attempt + 1`: exactly `2^attempt` seconds
#[inline]
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64.checked_pow(attempt).unwrap_or(u64::MAX))
}

/// Redis list sink
///
/// Shared by reference (typically behind `Arc`) between concurrent feed
/// workers; the connection pool is its only shared mutable state.
pub struct RedisSink<C: Connector = RedisConnector> {
    config: RedisSinkConfig,
    encoder: LogstashEncoder,
    serializer: JsonSerializer,
    pool: ConnectionPool<C>,
    name: String,
    metrics: Arc<SinkMetrics>,
    cancel: CancellationToken,
}

impl RedisSink<RedisConnector> {
    /// Create a sink connected to the configured Redis server
    ///
    /// Connections are opened lazily on the first write.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the URI cannot be
    /// parsed.
    pub fn new(config: RedisSinkConfig) -> Result<Self, RedisSinkError> {
        config.validate()?;
        let connector = RedisConnector::new(
            &config.uri,
            config.connection_timeout,
            config.write_timeout,
        )?;
        Ok(Self::with_connector(config, connector))
    }
}

impl<C: Connector> RedisSink<C> {
    /// Create a sink over a custom connector
    pub fn with_connector(config: RedisSinkConfig, connector: C) -> Self {
        let pool = ConnectionPool::new(connector, config.pool_size);
        Self {
            encoder: LogstashEncoder::new(config.type_tag.clone()),
            serializer: JsonSerializer::new(config.max_message_bytes),
            pool,
            name: "redis".into(),
            metrics: Arc::new(SinkMetrics::new()),
            cancel: CancellationToken::new(),
            config,
        }
    }

    /// Set the sink name used in logs and metrics
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Abort pending backoff sleeps when `cancel` fires
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Get the sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the sink configuration
    pub fn config(&self) -> &RedisSinkConfig {
        &self.config
    }

    /// Get the connection pool
    pub fn pool(&self) -> &ConnectionPool<C> {
        &self.pool
    }

    /// Get reference to metrics
    pub fn metrics(&self) -> &SinkMetrics {
        &self.metrics
    }

    /// Get a metrics handle for reporting
    pub fn metrics_handle(&self) -> RedisSinkMetricsHandle {
        RedisSinkMetricsHandle::new(
            self.name.clone(),
            Arc::clone(&self.metrics),
            SinkMetricsConfig {
                enabled: self.config.metrics_enabled,
                interval: self.config.metrics_interval,
            },
        )
    }

    /// Deliver one batch according to the configured write mode
    ///
    /// In serial mode only the first record that serializes is written;
    /// the remaining records of `batch` are not looked at.
    ///
    /// # Errors
    ///
    /// Returns error when the write is rejected by the server, when every
    /// attempt failed, or when shutdown interrupted a backoff sleep.
    pub async fn deliver(&self, batch: &[Record]) -> Result<(), RedisSinkError> {
        self.metrics.record_received();

        match self.config.write_mode {
            WriteMode::Batch => {
                let messages: Vec<WireMessage> =
                    batch.iter().filter_map(|record| self.prepare(record)).collect();

                if messages.is_empty() {
                    tracing::debug!(
                        sink = %self.name,
                        records = batch.len(),
                        "nothing to write"
                    );
                    return Ok(());
                }

                self.write_with_retry(&messages).await
            }
            WriteMode::Serial => {
                let Some(message) = batch.iter().find_map(|record| self.prepare(record)) else {
                    return Ok(());
                };

                self.write_with_retry(std::slice::from_ref(&message)).await
            }
        }
    }

    /// Encode and serialize one record, skipping it on failure
    fn prepare(&self, record: &Record) -> Option<WireMessage> {
        let normalized = self.encoder.encode(record);
        match self.serializer.serialize(&normalized) {
            Ok(message) => Some(message),
            Err(e) => {
                self.metrics.record_skip();
                tracing::warn!(
                    sink = %self.name,
                    error = %e,
                    "skipping record that could not be serialized"
                );
                None
            }
        }
    }

    /// Push `messages` in one command, retrying transient failures
    async fn write_with_retry(&self, messages: &[WireMessage]) -> Result<(), RedisSinkError> {
        let max_attempts = self.config.max_attempts.max(1);
        let bytes: u64 = messages.iter().map(|m| m.len() as u64).sum();
        let mut attempt = 0u32;

        loop {
            let error = match self.write_once(messages).await {
                Ok(list_len) => {
                    self.metrics.record_written(messages.len() as u64, bytes);
                    tracing::trace!(
                        sink = %self.name,
                        messages = messages.len(),
                        list_len,
                        "pushed messages"
                    );
                    return Ok(());
                }
                Err(e) => e,
            };

            if !error.is_transient() {
                self.metrics.record_failure();
                tracing::error!(
                    sink = %self.name,
                    key = %self.config.key,
                    error = %error,
                    "write rejected by server"
                );
                return Err(RedisSinkError::Rejected(error));
            }

            if attempt + 1 >= max_attempts {
                self.metrics.record_failure();
                tracing::error!(
                    sink = %self.name,
                    attempts = max_attempts,
                    messages = messages.len(),
                    error = %error,
                    "delivery failed, giving up"
                );
                return Err(RedisSinkError::DeliveryExhausted {
                    attempts: max_attempts,
                    last_error: error,
                });
            }

            let delay = backoff_delay(attempt);
            tracing::warn!(
                sink = %self.name,
                attempt = attempt + 1,
                max_attempts,
                delay_secs = delay.as_secs(),
                error = %error,
                "write failed, will retry"
            );

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    self.metrics.record_failure();
                    tracing::warn!(
                        sink = %self.name,
                        attempts = attempt + 1,
                        "retry interrupted by shutdown"
                    );
                    return Err(RedisSinkError::Interrupted { attempts: attempt + 1 });
                }
                _ = tokio::time::sleep(delay) => {}
            }

            attempt += 1;
            self.metrics.record_retry();
        }
    }

    /// One attempt on one pooled connection
    async fn write_once(&self, messages: &[WireMessage]) -> Result<u64, BackendError> {
        let mut conn = self.pool.acquire().await?;
        let result = conn.append(&self.config.key, messages).await;

        match &result {
            Err(e) if e.is_transient() => {
                conn.release(ConnectionHealth::Broken);
                self.metrics.record_eviction();
            }
            _ => conn.release(ConnectionHealth::Healthy),
        }

        result
    }

    /// Close idle connections and log final counters
    pub fn close(&self) -> SinkMetricsSnapshot {
        self.pool.clear();

        let snapshot = self.metrics.snapshot();
        tracing::info!(
            sink = %self.name,
            batches_received = snapshot.batches_received,
            batches_written = snapshot.batches_written,
            messages_written = snapshot.messages_written,
            bytes_written = snapshot.bytes_written,
            serialization_skips = snapshot.serialization_skips,
            retries = snapshot.retries,
            write_failures = snapshot.write_failures,
            "redis sink shutting down"
        );

        snapshot
    }
}

#[async_trait]
impl<C: Connector> BatchProcessor for RedisSink<C> {
    async fn process(&self, batch: &[Record]) -> Result<(), CallbackError> {
        self.deliver(batch)
            .await
            .map_err(|e| CallbackError::new(batch.len(), e))
    }
}
