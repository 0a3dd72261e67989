//! Metrics output formatters
//!
//! Formats sink and feed metrics for human-readable or JSON output.

mod human;
mod json;

pub use human::HumanFormatter;
pub use json::JsonFormatter;

use crate::{FeedMetricsSnapshot, SinkMetricsSnapshot};
use trailpipe_config::MetricsFormat;

/// Trait for metrics formatters
pub trait MetricsFormatter: Send + Sync {
    /// Format per-sink metrics report for one reporting period
    fn format_sink(
        &self,
        sink_id: &str,
        sink_type: &str,
        snapshot: &SinkMetricsSnapshot,
        interval_secs: u64,
    ) -> String;

    /// Format feed progress for one reporting period
    fn format_feed(&self, snapshot: &FeedMetricsSnapshot, interval_secs: u64) -> String;
}

/// Build the formatter for a configured output format
pub fn formatter_for(format: MetricsFormat) -> Box<dyn MetricsFormatter> {
    match format {
        MetricsFormat::Human => Box::new(HumanFormatter::new()),
        MetricsFormat::Json => Box::new(JsonFormatter::new()),
    }
}

/// Format a byte count with a binary unit suffix (KB, MB, GB)
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [(u64, &str); 3] = [(1 << 30, "GB"), (1 << 20, "MB"), (1 << 10, "KB")];

    UNITS
        .iter()
        .find(|(size, _)| bytes >= *size)
        .map(|(size, unit)| format!("{:.1} {unit}", bytes as f64 / *size as f64))
        .unwrap_or_else(|| format!("{bytes} B"))
}

/// Format a message count with a K/M suffix
pub fn format_count(count: u64) -> String {
    const UNITS: [(u64, &str); 2] = [(1_000_000, "M"), (1_000, "K")];

    UNITS
        .iter()
        .find(|(size, _)| count >= *size)
        .map(|(size, unit)| format!("{:.1}{unit}", count as f64 / *size as f64))
        .unwrap_or_else(|| count.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 512 * 1024), "1.5 MB");
        assert_eq!(format_bytes(512 * 1024 * 1024), "512.0 MB");
        assert_eq!(format_bytes(5 << 30), "5.0 GB");
    }

    #[test]
    fn test_format_count_units() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1.0K");
        assert_eq!(format_count(25_300), "25.3K");
        assert_eq!(format_count(2_000_000), "2.0M");
    }

    #[test]
    fn test_formatter_for() {
        let snapshot = SinkMetricsSnapshot::default();
        let human = formatter_for(MetricsFormat::Human).format_sink("q", "redis", &snapshot, 10);
        assert!(human.starts_with("[sink:q]"));

        let json = formatter_for(MetricsFormat::Json).format_sink("q", "redis", &snapshot, 10);
        assert!(json.starts_with('{'));

        let feed = FeedMetricsSnapshot::default();
        let human = formatter_for(MetricsFormat::Human).format_feed(&feed, 60);
        assert!(human.starts_with("[feed]"));
        let json = formatter_for(MetricsFormat::Json).format_feed(&feed, 60);
        assert!(json.contains("\"type\":\"feed\""));
    }
}
