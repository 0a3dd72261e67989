//! Check command - Validate configuration and print the effective settings

use anyhow::{Context, Result};
use clap::Args;
use trailpipe_config::Config;

use super::{ConfigOverrides, ConfigSource, LoadedConfig, redact_uri};

/// Check command arguments
#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

/// Run the check command
pub fn run(loaded: LoadedConfig, args: CheckArgs) -> Result<()> {
    let LoadedConfig { mut config, source } = loaded;
    args.overrides.apply(&mut config);
    config.validate().context("invalid configuration")?;

    print!("{}", render(&config, &source));
    Ok(())
}

/// Render the effective settings
fn render(config: &Config, source: &ConfigSource) -> String {
    let redis = &config.redis;
    let feed = &config.feed;
    let log = &config.log;
    let type_tag = redis
        .type_tag
        .as_deref()
        .filter(|tag| !tag.is_empty())
        .unwrap_or("(none)");

    format!(
        "config: {source} (ok)

[redis]
  uri                 {uri}
  key                 {key}
  write_mode          {write_mode}
  max_attempts        {max_attempts}
  type                {type_tag}
  pool_size           {pool_size}
  connection_timeout  {connection_timeout}ms
  write_timeout       {write_timeout}ms
  max_message_bytes   {max_message_bytes}

[feed]
  batch_size          {batch_size}
  workers             {workers}
  timestamp_field     {timestamp_field}
  queue_size          {queue_size}

[log]
  level               {level}
  format              {format:?}
  output              {output:?}
",
        uri = redact_uri(&redis.uri),
        key = redis.key,
        write_mode = redis.write_mode.as_str(),
        max_attempts = redis.max_attempts,
        pool_size = redis.pool_size,
        connection_timeout = redis.connection_timeout.as_millis(),
        write_timeout = redis.write_timeout.as_millis(),
        max_message_bytes = redis.max_message_bytes,
        batch_size = feed.batch_size,
        workers = feed.workers,
        timestamp_field = feed.timestamp_field,
        queue_size = feed.queue_size,
        level = log.level.as_str(),
        format = log.format,
        output = log.output,
    )
}
