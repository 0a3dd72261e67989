//! Serve command - Push records to the Redis queue
//!
//! Reads newline-delimited JSON from stdin or `--input` files and delivers
//! it through the Redis sink until the inputs are exhausted or a shutdown
//! signal arrives.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use trailpipe_metrics::{SinkMetricsProvider, spawn_feed_reporter, spawn_sink_reporters};
use trailpipe_sinks::{BatchProcessor, RedisSink, RedisSinkConfig};

use super::{ConfigOverrides, LoadedConfig, redact_uri};
use crate::feed::{Feed, Input};

/// Serve command arguments
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Newline-delimited JSON input file (repeatable, `-` for stdin)
    #[arg(short, long = "input", value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

/// Run the serve command
pub async fn run(loaded: LoadedConfig, args: ServeArgs) -> Result<()> {
    let LoadedConfig { mut config, source } = loaded;
    args.overrides.apply(&mut config);
    config.validate().context("invalid configuration")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        platform = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        config = %source,
        "trailpipe starting"
    );

    let cancel = CancellationToken::new();

    let sink_config =
        RedisSinkConfig::from_config(&config.redis).context("invalid redis sink configuration")?;
    let sink = Arc::new(
        RedisSink::new(sink_config)
            .context("failed to create redis sink")?
            .with_cancellation(cancel.clone()),
    );

    info!(
        uri = %redact_uri(&config.redis.uri),
        key = %config.redis.key,
        write_mode = config.redis.write_mode.as_str(),
        max_attempts = config.redis.max_attempts,
        type_tag = config.redis.type_tag.as_deref().unwrap_or(""),
        "redis sink ready"
    );

    let feed = Feed::new(&config.feed, Arc::clone(&sink) as Arc<dyn BatchProcessor>);

    // Reporters outlive the feed so the final period is still reported
    let reporter_cancel = CancellationToken::new();
    let mut reporters = Vec::new();
    if config.metrics.enabled {
        let handles: Vec<Arc<dyn SinkMetricsProvider>> = vec![Arc::new(sink.metrics_handle())];
        reporters.extend(spawn_sink_reporters(
            handles,
            config.metrics.format,
            reporter_cancel.clone(),
        ));
        reporters.push(spawn_feed_reporter(
            feed.metrics(),
            config.metrics.interval,
            config.metrics.format,
            reporter_cancel.clone(),
        ));
    }

    let signal_cancel = cancel.clone();
    let signals = tokio::spawn(async move {
        tokio::select! {
            _ = wait_for_shutdown() => {
                info!("shutdown signal received");
                signal_cancel.cancel();
            }
            _ = signal_cancel.cancelled() => {}
        }
    });

    let inputs = Input::from_paths(&args.inputs);
    let result = feed.run(&inputs, &cancel).await;

    // stop the signal task if the inputs ran out
    cancel.cancel();
    let _ = signals.await;

    reporter_cancel.cancel();
    for reporter in reporters {
        let _ = reporter.await;
    }

    let sink_summary = sink.close();

    let stats = match result {
        Ok(stats) => stats,
        Err(e) => {
            error!(error = %e, "feed error");
            return Err(e);
        }
    };

    info!(
        lines_read = stats.lines_read,
        records_accepted = stats.records_accepted,
        records_skipped = stats.records_skipped,
        batches_delivered = stats.batches_delivered,
        batches_failed = stats.batches_failed,
        records_failed = stats.records_failed,
        messages_written = sink_summary.messages_written,
        "trailpipe shutdown complete"
    );

    if stats.batches_failed > 0 {
        anyhow::bail!(
            "{} batches ({} records) could not be delivered",
            stats.batches_failed,
            stats.records_failed
        );
    }
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
///
/// Never completes if no handler can be installed.
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
