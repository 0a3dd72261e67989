//! JSON metrics formatter
//!
//! Formats metrics as structured JSON for machine parsing.
//!
//! # Example Output
//!
//! ```json
//! {"type":"sink","sink_id":"redis","sink_type":"redis","period_secs":10,"batches_written":240,...}
//! ```

use super::MetricsFormatter;
use crate::{FeedMetricsSnapshot, SinkMetricsSnapshot};
use serde::Serialize;

/// JSON metrics formatter
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

/// JSON structure for per-sink output
#[derive(Serialize)]
struct SinkReportJson<'a> {
    #[serde(rename = "type")]
    report_type: &'static str,
    sink_id: &'a str,
    sink_type: &'a str,
    period_secs: u64,
    #[serde(flatten)]
    counters: &'a SinkMetricsSnapshot,
}

/// JSON structure for feed progress output
#[derive(Serialize)]
struct FeedReportJson<'a> {
    #[serde(rename = "type")]
    report_type: &'static str,
    period_secs: u64,
    #[serde(flatten)]
    counters: &'a FeedMetricsSnapshot,
}

impl MetricsFormatter for JsonFormatter {
    fn format_sink(
        &self,
        sink_id: &str,
        sink_type: &str,
        snapshot: &SinkMetricsSnapshot,
        interval_secs: u64,
    ) -> String {
        let json = SinkReportJson {
            report_type: "sink",
            sink_id,
            sink_type,
            period_secs: interval_secs,
            counters: snapshot,
        };

        serde_json::to_string(&json).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_feed(&self, snapshot: &FeedMetricsSnapshot, interval_secs: u64) -> String {
        let json = FeedReportJson {
            report_type: "feed",
            period_secs: interval_secs,
            counters: snapshot,
        };

        serde_json::to_string(&json).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sink() {
        let formatter = JsonFormatter::new();
        let snapshot = SinkMetricsSnapshot {
            batches_written: 100,
            messages_written: 50_000,
            bytes_written: 10_000_000,
            retries: 4,
            write_failures: 1,
            ..Default::default()
        };

        let output = formatter.format_sink("redis", "redis", &snapshot, 10);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["type"], "sink");
        assert_eq!(parsed["sink_id"], "redis");
        assert_eq!(parsed["sink_type"], "redis");
        assert_eq!(parsed["period_secs"], 10);
        assert_eq!(parsed["batches_written"], 100);
        assert_eq!(parsed["messages_written"], 50_000);
        assert_eq!(parsed["retries"], 4);
        assert_eq!(parsed["write_failures"], 1);
        assert_eq!(parsed["serialization_skips"], 0);
    }

    #[test]
    fn test_format_feed() {
        let snapshot = FeedMetricsSnapshot {
            lines_read: 10,
            records_accepted: 8,
            records_skipped: 2,
            batches_failed: 1,
            records_failed: 8,
            ..Default::default()
        };

        let output = JsonFormatter::new().format_feed(&snapshot, 60);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["type"], "feed");
        assert_eq!(parsed["period_secs"], 60);
        assert_eq!(parsed["records_accepted"], 8);
        assert_eq!(parsed["batches_failed"], 1);
        assert_eq!(parsed["records_failed"], 8);
    }
}
