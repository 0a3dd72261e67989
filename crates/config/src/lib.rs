//! trailpipe Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! An empty file is a valid config: it pushes to `redis://localhost:6379/0`
//! under the `logstash` key, one record per write, with 5 attempts.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use trailpipe_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[redis]\nkey = \"cloudtrail\"").unwrap();
//! assert_eq!(config.redis.key, "cloudtrail");
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [log]
//! level = "info"
//!
//! [metrics]
//! interval = "60s"
//!
//! [redis]
//! uri = "redis://queue.internal:6379/0"
//! key = "logstash"
//! write_mode = "batch"
//! max_attempts = 5
//! type = "cloudtrail"
//!
//! [feed]
//! batch_size = 100   # batch writes only; serial requires 1
//! workers = 4
//! ```

mod error;
mod feed;
mod logging;
mod metrics;
mod redis;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use feed::{DEFAULT_FEED_BATCH_SIZE, DEFAULT_FEED_WORKERS, FeedConfig};
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use metrics::{MetricsConfig, MetricsFormat};
pub use redis::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_MESSAGE_BYTES, DEFAULT_REDIS_KEY, DEFAULT_REDIS_URI,
    DEFAULT_TYPE_TAG, RedisConfig, WriteMode,
};

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Metrics reporting configuration
    pub metrics: MetricsConfig,

    /// Redis queue sink
    pub redis: RedisConfig,

    /// Record feed (batching and worker count)
    pub feed: FeedConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML, or
    /// fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Parsing validates automatically; call this again after applying
    /// command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns the first invalid or missing setting found.
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::str::FromStr;
    use std::time::Duration;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.redis.uri, DEFAULT_REDIS_URI);
        assert_eq!(config.redis.key, DEFAULT_REDIS_KEY);
        assert_eq!(config.redis.write_mode, WriteMode::Serial);
        assert_eq!(config.redis.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.redis.type_tag.as_deref(), Some(DEFAULT_TYPE_TAG));
        assert_eq!(config.feed.batch_size, DEFAULT_FEED_BATCH_SIZE);
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[log]
level = "debug"
format = "json"

[metrics]
enabled = false
interval = "5s"

[redis]
uri = "redis://queue.internal:6380/2"
key = "audit"
write_mode = "batch"
max_attempts = 3
type = "trail"
pool_size = 4
connection_timeout = "2s"
write_timeout = "500ms"
max_message_bytes = 1048576

[feed]
batch_size = 50
workers = 2
timestamp_field = "time"
"#;
        let config = Config::from_str(toml).unwrap();

        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.log.format, LogFormat::Json);
        assert!(!config.metrics.enabled);
        assert_eq!(config.metrics.interval, Duration::from_secs(5));
        assert_eq!(config.redis.uri, "redis://queue.internal:6380/2");
        assert_eq!(config.redis.key, "audit");
        assert_eq!(config.redis.write_mode, WriteMode::Batch);
        assert_eq!(config.redis.max_attempts, 3);
        assert_eq!(config.redis.type_tag.as_deref(), Some("trail"));
        assert_eq!(config.redis.pool_size, 4);
        assert_eq!(config.redis.connection_timeout, Duration::from_secs(2));
        assert_eq!(config.redis.write_timeout, Duration::from_millis(500));
        assert_eq!(config.redis.max_message_bytes, 1_048_576);
        assert_eq!(config.feed.batch_size, 50);
        assert_eq!(config.feed.workers, 2);
        assert_eq!(config.feed.timestamp_field, "time");
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_str("invalid { toml");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validation_runs_on_parse() {
        let result = Config::from_str("[redis]\nmax_attempts = 0");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_validate_after_override() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.redis.key.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[redis]\nkey = \"from-file\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.redis.key, "from-file");
    }

    #[test]
    fn test_from_file_missing() {
        let result = Config::from_file("/nonexistent/trailpipe.toml");
        match result {
            Err(ConfigError::IoError { path, .. }) => assert!(path.contains("trailpipe.toml")),
            other => panic!("expected IoError, got {other:?}"),
        }
    }
}
