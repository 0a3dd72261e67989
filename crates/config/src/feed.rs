//! Record feed configuration
//!
//! Controls how the built-in newline-delimited JSON feed batches records
//! and how many batches are delivered to the sink concurrently.

use serde::Deserialize;

/// Default records per delivered batch
///
/// Serial writes push one record per batch, so only a batch size of one
/// delivers every record in that mode.
pub const DEFAULT_FEED_BATCH_SIZE: usize = 1;

/// Default number of concurrent delivery workers
pub const DEFAULT_FEED_WORKERS: usize = 4;

/// Feed configuration
///
/// # Example
///
/// ```toml
/// [feed]
/// batch_size = 1
/// workers = 4
/// timestamp_field = "eventTime"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Records per batch handed to the sink; must be 1 for serial writes
    /// Default: 1
    pub batch_size: usize,

    /// Concurrent delivery workers
    /// Default: 4
    pub workers: usize,

    /// Field holding each record's RFC 3339 event time
    /// Default: eventTime
    pub timestamp_field: String,

    /// Batches buffered between the reader and the workers
    /// Default: 16
    pub queue_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_FEED_BATCH_SIZE,
            workers: DEFAULT_FEED_WORKERS,
            timestamp_field: "eventTime".into(),
            queue_size: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FeedConfig::default();
        assert_eq!(config.batch_size, 1);
        assert_eq!(config.workers, 4);
        assert_eq!(config.timestamp_field, "eventTime");
        assert_eq!(config.queue_size, 16);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: FeedConfig = toml::from_str("workers = 1").unwrap();
        assert_eq!(config.workers, 1);
        assert_eq!(config.batch_size, DEFAULT_FEED_BATCH_SIZE);
    }
}
