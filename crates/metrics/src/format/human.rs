//! Human-readable metrics formatter
//!
//! # Example Output
//!
//! ```text
//! [sink:redis] period: 10s | batches: 240 | messages: 24.0K | bytes: 42.9 MB | skipped: 0 | retries: 2 | failed: 0
//! [feed] period: 60s | lines: 24.1K | accepted: 24.0K | skipped: 12 | batches: 240 | delivered: 240 | failed: 0
//! ```

use super::{MetricsFormatter, format_bytes, format_count};
use crate::{FeedMetricsSnapshot, SinkMetricsSnapshot};
use std::fmt::Write;

/// Human-readable metrics formatter
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter;

impl HumanFormatter {
    /// Create a new human formatter
    pub fn new() -> Self {
        Self
    }
}

impl MetricsFormatter for HumanFormatter {
    fn format_sink(
        &self,
        sink_id: &str,
        _sink_type: &str,
        snapshot: &SinkMetricsSnapshot,
        interval_secs: u64,
    ) -> String {
        let mut output = format!(
            "[sink:{}] period: {}s | batches: {} | messages: {} | bytes: {} | skipped: {} | retries: {} | failed: {}",
            sink_id,
            interval_secs,
            format_count(snapshot.batches_written),
            format_count(snapshot.messages_written),
            format_bytes(snapshot.bytes_written),
            snapshot.serialization_skips,
            snapshot.retries,
            snapshot.write_failures,
        );

        if snapshot.connections_evicted > 0 {
            let _ = write!(output, " | evicted: {}", snapshot.connections_evicted);
        }

        output
    }

    fn format_feed(&self, snapshot: &FeedMetricsSnapshot, interval_secs: u64) -> String {
        let mut output = format!(
            "[feed] period: {}s | lines: {} | accepted: {} | skipped: {} | batches: {} | delivered: {} | failed: {}",
            interval_secs,
            format_count(snapshot.lines_read),
            format_count(snapshot.records_accepted),
            snapshot.records_skipped,
            format_count(snapshot.batches_dispatched),
            format_count(snapshot.batches_delivered),
            snapshot.batches_failed,
        );

        if snapshot.records_failed > 0 {
            let _ = write!(output, " | records lost: {}", snapshot.records_failed);
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sink() {
        let formatter = HumanFormatter::new();
        let snapshot = SinkMetricsSnapshot {
            batches_written: 240,
            messages_written: 24_000,
            bytes_written: 45_000_000,
            retries: 2,
            ..Default::default()
        };

        let output = formatter.format_sink("redis", "redis", &snapshot, 10);

        assert!(output.contains("[sink:redis]"));
        assert!(output.contains("period: 10s"));
        assert!(output.contains("batches: 240"));
        assert!(output.contains("messages: 24.0K"));
        assert!(output.contains("bytes: 42.9 MB"));
        assert!(output.contains("retries: 2"));
        assert!(output.contains("failed: 0"));
        assert!(!output.contains("evicted"));
    }

    #[test]
    fn test_format_sink_with_evictions() {
        let formatter = HumanFormatter::new();
        let snapshot = SinkMetricsSnapshot {
            write_failures: 1,
            connections_evicted: 5,
            serialization_skips: 3,
            ..Default::default()
        };

        let output = formatter.format_sink("queue", "redis", &snapshot, 5);
        assert!(output.contains("skipped: 3"));
        assert!(output.contains("failed: 1"));
        assert!(output.contains("evicted: 5"));
    }

    #[test]
    fn test_format_feed() {
        let formatter = HumanFormatter::new();
        let snapshot = FeedMetricsSnapshot {
            lines_read: 24_100,
            records_accepted: 24_000,
            records_skipped: 12,
            batches_dispatched: 240,
            batches_delivered: 239,
            batches_failed: 1,
            records_failed: 100,
        };

        let output = formatter.format_feed(&snapshot, 60);
        assert_eq!(
            output,
            "[feed] period: 60s | lines: 24.1K | accepted: 24.0K | skipped: 12 | batches: 240 | delivered: 239 | failed: 1 | records lost: 100"
        );
    }
}
