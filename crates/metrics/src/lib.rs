//! trailpipe - Metrics
//!
//! Sink counters and periodic reporting for observability.
//!
//! # Overview
//!
//! This crate provides:
//! - Atomic sink counters (batches, messages, bytes, skips, retries, failures)
//! - A provider trait for sinks to expose their metrics
//! - Output formatters (human, JSON)
//! - Per-sink periodic reporting
//! - Record feed counters and progress reporting
//!
//! # Metrics Handle Pattern
//!
//! Sinks keep `Arc<SinkMetrics>` internally and provide a `metrics_handle()`
//! method that returns a lightweight handle implementing
//! [`SinkMetricsProvider`]. The handle stays valid while workers share the
//! sink.
//!
//! ```text
//! RedisSink (owns Arc<SinkMetrics>)
//!     │
//!     ├──► metrics_handle() → handle (clones Arc, implements SinkMetricsProvider)
//!     │
//!     └──► shared by feed workers calling process()
//!
//! serve wiring:
//!     1. Build the sink
//!     2. Call metrics_handle() → Vec<Arc<dyn SinkMetricsProvider>>
//!     3. spawn_sink_reporters(handles, format, cancel)
//! ```

mod feed;
pub mod format;
mod sink_reporter;
mod traits;

pub use feed::{FeedMetrics, FeedMetricsSnapshot, FeedReporter, spawn_feed_reporter};
pub use format::{HumanFormatter, JsonFormatter, MetricsFormatter};
pub use sink_reporter::{SinkReporter, spawn_sink_reporters};
pub use traits::{SinkMetrics, SinkMetricsConfig, SinkMetricsProvider, SinkMetricsSnapshot};
