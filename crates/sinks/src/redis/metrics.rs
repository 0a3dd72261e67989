//! Redis sink metrics handle

use std::sync::Arc;

use trailpipe_metrics::{SinkMetrics, SinkMetricsConfig, SinkMetricsProvider, SinkMetricsSnapshot};

/// Handle for accessing Redis sink metrics
///
/// Holds an Arc to the sink's counters, so it stays valid independently of
/// the sink and can be registered with a reporter before delivery starts.
#[derive(Clone)]
pub struct RedisSinkMetricsHandle {
    id: String,
    metrics: Arc<SinkMetrics>,
    config: SinkMetricsConfig,
}

impl RedisSinkMetricsHandle {
    /// Create a new metrics handle
    pub fn new(id: String, metrics: Arc<SinkMetrics>, config: SinkMetricsConfig) -> Self {
        Self {
            id,
            metrics,
            config,
        }
    }
}

impl SinkMetricsProvider for RedisSinkMetricsHandle {
    fn sink_id(&self) -> &str {
        &self.id
    }

    fn sink_type(&self) -> &str {
        "redis"
    }

    fn metrics_config(&self) -> SinkMetricsConfig {
        self.config
    }

    fn snapshot(&self) -> SinkMetricsSnapshot {
        self.metrics.snapshot()
    }
}
