//! Redis sink configuration

use std::time::Duration;

use trailpipe_config::{RedisConfig, WriteMode};

use super::error::RedisSinkError;

/// Configuration for the Redis sink
#[derive(Debug, Clone)]
pub struct RedisSinkConfig {
    /// Connection URI
    pub uri: String,

    /// List key messages are appended to
    pub key: String,

    /// Serial or batch writes
    pub write_mode: WriteMode,

    /// Attempts per write, including the first
    pub max_attempts: u32,

    /// `type` field value; `None` or empty omits the field
    pub type_tag: Option<String>,

    /// Maximum concurrently checked-out connections
    pub pool_size: usize,

    /// Connection establishment timeout
    pub connection_timeout: Duration,

    /// Timeout for one push command
    pub write_timeout: Duration,

    /// Largest serialized message accepted
    pub max_message_bytes: usize,

    /// Whether periodic metrics reporting is enabled
    pub metrics_enabled: bool,

    /// Metrics reporting interval
    pub metrics_interval: Duration,
}

impl RedisSinkConfig {
    /// Create a config for `uri` and `key` with default settings
    ///
    /// # Errors
    ///
    /// Returns error if the URI or key is empty.
    pub fn new(uri: impl Into<String>, key: impl Into<String>) -> Result<Self, RedisSinkError> {
        let defaults = RedisConfig::default();
        let config = Self {
            uri: uri.into(),
            key: key.into(),
            write_mode: defaults.write_mode,
            max_attempts: defaults.max_attempts,
            type_tag: defaults.type_tag,
            pool_size: defaults.pool_size,
            connection_timeout: defaults.connection_timeout,
            write_timeout: defaults.write_timeout,
            max_message_bytes: defaults.max_message_bytes,
            metrics_enabled: defaults.metrics_enabled,
            metrics_interval: defaults.metrics_interval,
        };
        config.validate()?;
        Ok(config)
    }

    /// Build from the `[redis]` config section
    ///
    /// # Errors
    ///
    /// Returns error if a required setting is empty or zero.
    pub fn from_config(config: &RedisConfig) -> Result<Self, RedisSinkError> {
        let sink_config = Self {
            uri: config.uri.clone(),
            key: config.key.clone(),
            write_mode: config.write_mode,
            max_attempts: config.max_attempts,
            type_tag: config.type_tag.clone(),
            pool_size: config.pool_size,
            connection_timeout: config.connection_timeout,
            write_timeout: config.write_timeout,
            max_message_bytes: config.max_message_bytes,
            metrics_enabled: config.metrics_enabled,
            metrics_interval: config.metrics_interval,
        };
        sink_config.validate()?;
        Ok(sink_config)
    }

    /// Check settings the sink cannot run without
    ///
    /// # Errors
    ///
    /// Returns the first empty or zero setting found.
    pub fn validate(&self) -> Result<(), RedisSinkError> {
        if self.uri.trim().is_empty() {
            return Err(RedisSinkError::config("uri must not be empty"));
        }
        if self.key.trim().is_empty() {
            return Err(RedisSinkError::config("key must not be empty"));
        }
        if self.max_attempts == 0 {
            return Err(RedisSinkError::config("max_attempts must be at least 1"));
        }
        if self.pool_size == 0 {
            return Err(RedisSinkError::config("pool_size must be at least 1"));
        }
        if self.max_message_bytes == 0 {
            return Err(RedisSinkError::config("max_message_bytes must be at least 1"));
        }
        Ok(())
    }

    /// Set write mode
    #[must_use]
    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    /// Set the attempt budget
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the `type` field value
    #[must_use]
    pub fn with_type_tag(mut self, tag: Option<String>) -> Self {
        self.type_tag = tag;
        self
    }

    /// Set pool size
    #[must_use]
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    /// Set connection timeout
    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set write timeout
    #[must_use]
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set the message size limit
    #[must_use]
    pub fn with_max_message_bytes(mut self, max: usize) -> Self {
        self.max_message_bytes = max;
        self
    }

    /// Set metrics reporting
    #[must_use]
    pub fn with_metrics(mut self, enabled: bool, interval: Duration) -> Self {
        self.metrics_enabled = enabled;
        self.metrics_interval = interval;
        self
    }
}
