//! Command implementations for the trailpipe CLI

pub mod check;
pub mod serve;

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use trailpipe_config::{Config, WriteMode};

/// Default config locations, tried in order when `--config` is not given
const DEFAULT_CONFIG_PATHS: [&str; 2] = ["configs/trailpipe.toml", "trailpipe.toml"];

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicit `--config` path
    Explicit(PathBuf),
    /// Found at one of the default locations
    Discovered(PathBuf),
    /// No file; built-in defaults
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(path) | Self::Discovered(path) => write!(f, "{}", path.display()),
            Self::Defaults => f.write_str("(defaults)"),
        }
    }
}

/// A parsed and validated configuration with its origin
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
}

/// Load configuration
///
/// An explicit path must exist. Otherwise the default locations are tried
/// and built-in defaults are used if none is present.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("config file not found: {}", path.display());
        }
        let config = Config::from_file(path).context("failed to load configuration")?;
        return Ok(LoadedConfig {
            config,
            source: ConfigSource::Explicit(path.to_path_buf()),
        });
    }

    load_from_candidates(DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from))
}

fn load_from_candidates(candidates: impl IntoIterator<Item = PathBuf>) -> Result<LoadedConfig> {
    for path in candidates {
        if path.exists() {
            let config = Config::from_file(&path).context("failed to load configuration")?;
            return Ok(LoadedConfig {
                config,
                source: ConfigSource::Discovered(path),
            });
        }
    }

    Ok(LoadedConfig {
        config: Config::default(),
        source: ConfigSource::Defaults,
    })
}

/// Command-line overrides for the `[redis]` section
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Redis connection URI
    #[arg(long, env = "TRAILPIPE_REDIS_URI")]
    pub redis_uri: Option<String>,

    /// Redis list key records are pushed to
    #[arg(long)]
    pub redis_key: Option<String>,

    /// Push each delivered batch with a single RPUSH
    #[arg(long)]
    pub redis_batch: bool,

    /// Maximum write attempts per batch
    #[arg(long)]
    pub redis_retries: Option<u32>,

    /// Value of the `type` field (empty to omit the field)
    #[arg(long = "type")]
    pub type_tag: Option<String>,
}

impl ConfigOverrides {
    /// Apply the overrides on top of a loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(uri) = &self.redis_uri {
            config.redis.uri = uri.clone();
        }
        if let Some(key) = &self.redis_key {
            config.redis.key = key.clone();
        }
        if self.redis_batch {
            config.redis.write_mode = WriteMode::Batch;
        }
        if let Some(attempts) = self.redis_retries {
            config.redis.max_attempts = attempts;
        }
        if let Some(tag) = &self.type_tag {
            config.redis.type_tag = (!tag.is_empty()).then(|| tag.clone());
        }
    }
}

/// Hide the password of a Redis URI for display
pub fn redact_uri(uri: &str) -> String {
    let Some((scheme, rest)) = uri.split_once("://") else {
        return uri.to_string();
    };
    // userinfo ends at the last '@' before the path
    let authority_end = rest.find('/').unwrap_or(rest.len());
    let Some(at) = rest[..authority_end].rfind('@') else {
        return uri.to_string();
    };

    let userinfo = &rest[..at];
    let user = match userinfo.split_once(':') {
        Some((user, _)) => format!("{user}:***"),
        None => "***".to_string(),
    };
    format!("{scheme}://{user}{}", &rest[at..])
}
