//! Feed metrics and progress reporter
//!
//! The record feed counts lines, records, and batches here; a reporter logs
//! the activity of each period through the configured formatter, the same
//! way sink reporters do.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use trailpipe_config::MetricsFormat;
use tracing::info;

use crate::format::{MetricsFormatter, formatter_for};

/// Counters for the record feed
#[derive(Debug, Default)]
pub struct FeedMetrics {
    /// Input lines read, blank lines included
    pub lines_read: AtomicU64,
    /// Lines parsed into records
    pub records_accepted: AtomicU64,
    /// Malformed lines skipped
    pub records_skipped: AtomicU64,
    /// Batches handed to workers
    pub batches_dispatched: AtomicU64,
    /// Batches the processor accepted
    pub batches_delivered: AtomicU64,
    /// Batches that failed or were abandoned on shutdown
    pub batches_failed: AtomicU64,
    /// Records in failed or abandoned batches
    pub records_failed: AtomicU64,
}

impl FeedMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_line(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_accepted(&self) {
        self.records_accepted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_skipped(&self) {
        self.records_skipped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_dispatched(&self) {
        self.batches_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_delivered(&self) {
        self.batches_delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a batch of `records` records that was not delivered
    #[inline]
    pub fn record_failed(&self, records: u64) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
        self.records_failed.fetch_add(records, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FeedMetricsSnapshot {
        FeedMetricsSnapshot {
            lines_read: self.lines_read.load(Ordering::Relaxed),
            records_accepted: self.records_accepted.load(Ordering::Relaxed),
            records_skipped: self.records_skipped.load(Ordering::Relaxed),
            batches_dispatched: self.batches_dispatched.load(Ordering::Relaxed),
            batches_delivered: self.batches_delivered.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            records_failed: self.records_failed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of feed metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct FeedMetricsSnapshot {
    pub lines_read: u64,
    pub records_accepted: u64,
    pub records_skipped: u64,
    pub batches_dispatched: u64,
    pub batches_delivered: u64,
    pub batches_failed: u64,
    pub records_failed: u64,
}

impl FeedMetricsSnapshot {
    /// Counts accumulated since `previous`
    pub fn delta_since(&self, previous: &Self) -> Self {
        Self {
            lines_read: self.lines_read.saturating_sub(previous.lines_read),
            records_accepted: self.records_accepted.saturating_sub(previous.records_accepted),
            records_skipped: self.records_skipped.saturating_sub(previous.records_skipped),
            batches_dispatched: self
                .batches_dispatched
                .saturating_sub(previous.batches_dispatched),
            batches_delivered: self
                .batches_delivered
                .saturating_sub(previous.batches_delivered),
            batches_failed: self.batches_failed.saturating_sub(previous.batches_failed),
            records_failed: self.records_failed.saturating_sub(previous.records_failed),
        }
    }
}

/// Periodic feed progress reporter
pub struct FeedReporter {
    metrics: Arc<FeedMetrics>,
    formatter: Box<dyn MetricsFormatter>,
    previous: FeedMetricsSnapshot,
}

impl FeedReporter {
    pub fn new(metrics: Arc<FeedMetrics>, format: MetricsFormat) -> Self {
        Self {
            metrics,
            formatter: formatter_for(format),
            previous: FeedMetricsSnapshot::default(),
        }
    }

    /// Report every `period` until cancelled, then once more for the
    /// final partial period
    pub async fn run(mut self, period: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    self.report(period);
                    break;
                }
                _ = ticker.tick() => {
                    self.report(period);
                }
            }
        }
    }

    fn report(&mut self, period: Duration) -> String {
        let snapshot = self.metrics.snapshot();
        let delta = snapshot.delta_since(&self.previous);
        let output = self.formatter.format_feed(&delta, period.as_secs());

        info!("{}", output);

        self.previous = snapshot;
        output
    }
}

/// Spawn the feed progress reporter
pub fn spawn_feed_reporter(
    metrics: Arc<FeedMetrics>,
    period: Duration,
    format: MetricsFormat,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let reporter = FeedReporter::new(metrics, format);
    tokio::spawn(reporter.run(period, cancel))
}
