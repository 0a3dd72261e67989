//! Per-sink metrics reporter
//!
//! Reports each sink's activity for the last period at its configured
//! interval.

use crate::{SinkMetricsProvider, SinkMetricsSnapshot, format::MetricsFormatter};
use std::sync::Arc;
use tokio::time::{Duration, interval};
use tokio_util::sync::CancellationToken;
use trailpipe_config::MetricsFormat;
use tracing::info;

/// Per-sink metrics reporter
///
/// Spawn one of these for each sink that has metrics enabled.
pub struct SinkReporter {
    sink: Arc<dyn SinkMetricsProvider>,
    formatter: Box<dyn MetricsFormatter>,
    previous: SinkMetricsSnapshot,
}

impl SinkReporter {
    /// Create a new sink reporter
    pub fn new(sink: Arc<dyn SinkMetricsProvider>, format: MetricsFormat) -> Self {
        Self {
            sink,
            formatter: crate::format::formatter_for(format),
            previous: SinkMetricsSnapshot::default(),
        }
    }

    /// Run the reporter until cancellation
    ///
    /// The activity since the last tick is reported once more on the way
    /// out so the final period is not lost.
    pub async fn run(mut self, cancel: CancellationToken) {
        let config = self.sink.metrics_config();

        if !config.enabled {
            return;
        }

        let mut ticker = interval(config.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // first tick completes immediately
        ticker.tick().await;

        info!(
            sink_id = self.sink.sink_id(),
            sink_type = self.sink.sink_type(),
            interval_secs = config.interval.as_secs(),
            "sink metrics reporter started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    self.report(config.interval);
                    break;
                }
                _ = ticker.tick() => {
                    self.report(config.interval);
                }
            }
        }
    }

    /// Report activity since the previous report
    fn report(&mut self, report_interval: Duration) -> String {
        let snapshot = self.sink.snapshot();
        let period = snapshot.delta_since(&self.previous);

        let output = self.formatter.format_sink(
            self.sink.sink_id(),
            self.sink.sink_type(),
            &period,
            report_interval.as_secs(),
        );

        info!("{}", output);

        self.previous = snapshot;
        output
    }
}

/// Spawn sink reporters for all sinks with metrics enabled
pub fn spawn_sink_reporters(
    sinks: Vec<Arc<dyn SinkMetricsProvider>>,
    format: MetricsFormat,
    cancel: CancellationToken,
) -> Vec<tokio::task::JoinHandle<()>> {
    sinks
        .into_iter()
        .filter(|sink| sink.metrics_config().enabled)
        .map(|sink| {
            let reporter = SinkReporter::new(sink, format);
            let cancel = cancel.clone();
            tokio::spawn(async move {
                reporter.run(cancel).await;
            })
        })
        .collect()
}
