//! trailpipe - Audit records into a Logstash Redis queue
//!
//! # Usage
//!
//! ```bash
//! # Push newline-delimited JSON records from stdin (default command)
//! trailpipe < events.ndjson
//! trailpipe --config configs/trailpipe.toml --input events.ndjson
//!
//! # Override settings from the command line
//! trailpipe serve --redis-uri redis://queue:6379/0 --redis-batch --type cloudtrail
//!
//! # Validate a config file and print the effective settings
//! trailpipe check --config configs/trailpipe.toml
//! ```

mod cmd;
mod feed;

use std::fs::OpenOptions;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;
use trailpipe_config::{LogConfig, LogFormat, LogOutput};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// trailpipe - Audit records into a Logstash Redis queue
#[derive(Parser, Debug)]
#[command(name = "trailpipe")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    // Serve args when no subcommand is given
    #[command(flatten)]
    serve: cmd::serve::ServeArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Push records to Redis (default)
    Serve(cmd::serve::ServeArgs),

    /// Validate configuration and print the effective settings
    Check(cmd::check::CheckArgs),
}

/// How long runtime shutdown waits on blocking tasks
///
/// A stdin read cannot be cancelled; without a bound, shutdown would wait
/// for the next input line.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

fn main() -> Result<()> {
    let cli = Cli::parse();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    block_on_then_shutdown(runtime, run(cli), SHUTDOWN_GRACE)
}

/// Drive `future` to completion, then shut the runtime down, waiting at
/// most `grace` for blocking tasks still running
fn block_on_then_shutdown<F: Future>(runtime: Runtime, future: F, grace: Duration) -> F::Output {
    let output = runtime.block_on(future);
    runtime.shutdown_timeout(grace);
    output
}

async fn run(cli: Cli) -> Result<()> {
    let loaded = cmd::load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Command::Check(args)) => {
            // Check doesn't need logging - just outputs to stdout
            cmd::check::run(loaded, args)
        }
        Some(Command::Serve(args)) => {
            init_logging(cli.log_level.as_deref(), &loaded.config.log)?;
            cmd::serve::run(loaded, args).await
        }
        None => {
            init_logging(cli.log_level.as_deref(), &loaded.config.log)?;
            cmd::serve::run(loaded, cli.serve).await
        }
    }
}

/// Resolve log level: CLI flag > config file > default "info"
fn resolve_log_level(cli_level: Option<&str>, log: &LogConfig) -> String {
    match cli_level {
        Some(level) => level.to_string(),
        None => log.level.as_str().to_string(),
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(cli_level: Option<&str>, log: &LogConfig) -> Result<()> {
    let level = resolve_log_level(cli_level, log);
    let filter = EnvFilter::try_new(&level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let (writer, ansi) = match &log.output {
        LogOutput::Stdout => (BoxMakeWriter::new(std::io::stdout), true),
        LogOutput::Stderr => (BoxMakeWriter::new(std::io::stderr), true),
        LogOutput::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file '{path}'"))?;
            (BoxMakeWriter::new(Arc::new(file)), false)
        }
    };

    let layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_ansi(ansi)
        .with_writer(writer);

    match log.format {
        LogFormat::Console => tracing_subscriber::registry()
            .with(layer)
            .with(filter)
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(layer.json())
            .with(filter)
            .init(),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use trailpipe_config::LogLevel;

    #[test]
    fn test_shutdown_does_not_wait_on_blocked_reads() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();
        let (release, blocked) = std::sync::mpsc::channel::<()>();

        let started = std::time::Instant::now();
        let output = block_on_then_shutdown(
            runtime,
            async move {
                // stands in for a stdin read with no input arriving
                tokio::task::spawn_blocking(move || {
                    let _ = blocked.recv();
                });
                42
            },
            Duration::from_millis(100),
        );

        assert_eq!(output, 42);
        assert!(started.elapsed() < Duration::from_secs(5));
        drop(release);
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_level_cli_wins() {
        let log = LogConfig {
            level: LogLevel::Warn,
            ..Default::default()
        };
        assert_eq!(resolve_log_level(Some("debug"), &log), "debug");
        assert_eq!(resolve_log_level(None, &log), "warn");
        assert_eq!(resolve_log_level(None, &LogConfig::default()), "info");
    }

    #[test]
    fn test_no_subcommand_parses_serve_args() {
        let cli = Cli::parse_from([
            "trailpipe",
            "--input",
            "a.ndjson",
            "--redis-batch",
            "--redis-retries",
            "3",
        ]);
        assert!(cli.command.is_none());
        assert_eq!(cli.serve.inputs.len(), 1);
        assert!(cli.serve.overrides.redis_batch);
        assert_eq!(cli.serve.overrides.redis_retries, Some(3));
    }

    #[test]
    fn test_check_subcommand_with_global_config() {
        let cli = Cli::parse_from(["trailpipe", "check", "--config", "x.toml", "--type", ""]);
        match cli.command {
            Some(Command::Check(args)) => assert_eq!(args.overrides.type_tag.as_deref(), Some("")),
            other => panic!("expected check, got {other:?}"),
        }
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("x.toml")));
    }
}
