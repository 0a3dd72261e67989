//! Sink metrics and the provider trait
//!
//! Sinks record into [`SinkMetrics`] with relaxed atomics and expose
//! snapshots through [`SinkMetricsProvider`] so reporters can collect them
//! without knowing the concrete sink type.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics for a sink component
///
/// All fields use atomics for lock-free updates.
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Total batches handed to the sink
    pub batches_received: AtomicU64,
    /// Total batches successfully written
    pub batches_written: AtomicU64,
    /// Total messages written
    pub messages_written: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
    /// Records skipped because they could not be serialized
    pub serialization_skips: AtomicU64,
    /// Write attempts after the first
    pub retries: AtomicU64,
    /// Connections discarded after a failed write
    pub connections_evicted: AtomicU64,
    /// Batches that ended in a delivery failure
    pub write_failures: AtomicU64,
}

impl SinkMetrics {
    /// Create new metrics with all counters at zero
    pub const fn new() -> Self {
        Self {
            batches_received: AtomicU64::new(0),
            batches_written: AtomicU64::new(0),
            messages_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            serialization_skips: AtomicU64::new(0),
            retries: AtomicU64::new(0),
            connections_evicted: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
        }
    }

    /// Record a received batch
    #[inline]
    pub fn record_received(&self) {
        self.batches_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successfully written batch
    #[inline]
    pub fn record_written(&self, messages: u64, bytes: u64) {
        self.batches_written.fetch_add(1, Ordering::Relaxed);
        self.messages_written.fetch_add(messages, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a record skipped during serialization
    #[inline]
    pub fn record_skip(&self) {
        self.serialization_skips.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a retried write attempt
    #[inline]
    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an evicted connection
    #[inline]
    pub fn record_eviction(&self) {
        self.connections_evicted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed delivery
    #[inline]
    pub fn record_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a snapshot of current values
    #[inline]
    pub fn snapshot(&self) -> SinkMetricsSnapshot {
        SinkMetricsSnapshot {
            batches_received: self.batches_received.load(Ordering::Relaxed),
            batches_written: self.batches_written.load(Ordering::Relaxed),
            messages_written: self.messages_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            serialization_skips: self.serialization_skips.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            connections_evicted: self.connections_evicted.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of sink metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SinkMetricsSnapshot {
    pub batches_received: u64,
    pub batches_written: u64,
    pub messages_written: u64,
    pub bytes_written: u64,
    pub serialization_skips: u64,
    pub retries: u64,
    pub connections_evicted: u64,
    pub write_failures: u64,
}

impl SinkMetricsSnapshot {
    /// Counts accumulated since `previous`
    pub fn delta_since(&self, previous: &Self) -> Self {
        Self {
            batches_received: self.batches_received.saturating_sub(previous.batches_received),
            batches_written: self.batches_written.saturating_sub(previous.batches_written),
            messages_written: self.messages_written.saturating_sub(previous.messages_written),
            bytes_written: self.bytes_written.saturating_sub(previous.bytes_written),
            serialization_skips: self
                .serialization_skips
                .saturating_sub(previous.serialization_skips),
            retries: self.retries.saturating_sub(previous.retries),
            connections_evicted: self
                .connections_evicted
                .saturating_sub(previous.connections_evicted),
            write_failures: self.write_failures.saturating_sub(previous.write_failures),
        }
    }
}

/// Per-sink metrics configuration
#[derive(Debug, Clone, Copy)]
pub struct SinkMetricsConfig {
    /// Whether per-sink metrics reporting is enabled
    pub enabled: bool,
    /// Reporting interval for this sink
    pub interval: Duration,
}

impl Default for SinkMetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(10),
        }
    }
}

/// Trait for sinks to provide metrics to the reporter
pub trait SinkMetricsProvider: Send + Sync {
    /// Unique identifier for this sink instance
    fn sink_id(&self) -> &str;

    /// Sink type (e.g., "redis")
    fn sink_type(&self) -> &str;

    /// Get per-sink metrics configuration
    fn metrics_config(&self) -> SinkMetricsConfig;

    /// Get a snapshot of current metrics
    fn snapshot(&self) -> SinkMetricsSnapshot;
}
