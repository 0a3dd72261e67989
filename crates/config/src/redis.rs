//! Redis sink configuration
//!
//! Where records are pushed and how delivery is retried.

use serde::Deserialize;
use std::time::Duration;

/// Default backend URI
pub const DEFAULT_REDIS_URI: &str = "redis://localhost:6379/0";

/// Default list key records are pushed to
pub const DEFAULT_REDIS_KEY: &str = "logstash";

/// Default number of write attempts per batch
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default largest serialized record, the Redis string size limit
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 512 * 1024 * 1024;

/// Default value of the `type` field on every event
pub const DEFAULT_TYPE_TAG: &str = "cloudtrail";

/// How records are grouped into backend writes
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Push a single record per delivered batch (default)
    ///
    /// Only the first record that serializes is written; the remaining
    /// records of the batch are not processed.
    #[default]
    Serial,
    /// Push every record of a delivered batch in one write
    Batch,
}

impl WriteMode {
    /// Mode name as written in config
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Serial => "serial",
            Self::Batch => "batch",
        }
    }
}

/// Redis sink configuration
///
/// # Example
///
/// ```toml
/// [redis]
/// uri = "redis://localhost:6379/0"
/// key = "logstash"
/// write_mode = "batch"
/// max_attempts = 5
/// type = "cloudtrail"   # "" omits the type field
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Connection URI (redis://, rediss://, or unix://)
    /// Default: redis://localhost:6379/0
    pub uri: String,

    /// List key records are appended to
    /// Default: logstash
    pub key: String,

    /// Serial or batch writes
    /// Default: serial
    pub write_mode: WriteMode,

    /// Attempts per write before giving up; backoff doubles from 1s
    /// Default: 5
    pub max_attempts: u32,

    /// Value of the `type` field; empty disables the field
    /// Default: cloudtrail
    #[serde(rename = "type")]
    pub type_tag: Option<String>,

    /// Maximum concurrently checked-out connections
    /// Default: 8
    pub pool_size: usize,

    /// Timeout for establishing a connection
    /// Default: 10s
    #[serde(with = "humantime_serde")]
    pub connection_timeout: Duration,

    /// Timeout for a single push command
    /// Default: 5s
    #[serde(with = "humantime_serde")]
    pub write_timeout: Duration,

    /// Largest serialized record accepted; larger records are skipped
    /// Default: 512 MiB
    pub max_message_bytes: usize,

    /// Enable per-sink metrics reporting
    /// Default: true
    pub metrics_enabled: bool,

    /// Per-sink metrics reporting interval
    /// Default: 10s
    #[serde(with = "humantime_serde")]
    pub metrics_interval: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_REDIS_URI.into(),
            key: DEFAULT_REDIS_KEY.into(),
            write_mode: WriteMode::Serial,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            type_tag: Some(DEFAULT_TYPE_TAG.into()),
            pool_size: 8,
            connection_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(5),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            metrics_enabled: true,
            metrics_interval: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RedisConfig::default();
        assert_eq!(config.uri, "redis://localhost:6379/0");
        assert_eq!(config.key, "logstash");
        assert_eq!(config.write_mode, WriteMode::Serial);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.type_tag.as_deref(), Some("cloudtrail"));
        assert_eq!(config.pool_size, 8);
        assert_eq!(config.max_message_bytes, DEFAULT_MAX_MESSAGE_BYTES);
        assert_eq!(DEFAULT_MAX_MESSAGE_BYTES, 536_870_912);
    }

    #[test]
    fn test_deserialize_empty() {
        let config: RedisConfig = toml::from_str("").unwrap();
        assert_eq!(config.key, DEFAULT_REDIS_KEY);
        assert_eq!(config.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.connection_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_deserialize_write_modes() {
        let serial: RedisConfig = toml::from_str("write_mode = \"serial\"").unwrap();
        assert_eq!(serial.write_mode, WriteMode::Serial);

        let batch: RedisConfig = toml::from_str("write_mode = \"batch\"").unwrap();
        assert_eq!(batch.write_mode, WriteMode::Batch);

        assert!(toml::from_str::<RedisConfig>("write_mode = \"parallel\"").is_err());
    }

    #[test]
    fn test_empty_type_tag_is_kept_as_empty() {
        let config: RedisConfig = toml::from_str("type = \"\"").unwrap();
        assert_eq!(config.type_tag.as_deref(), Some(""));
    }

    #[test]
    fn test_write_mode_as_str() {
        assert_eq!(WriteMode::Serial.as_str(), "serial");
        assert_eq!(WriteMode::Batch.as_str(), "batch");
    }
}
