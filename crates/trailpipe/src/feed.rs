//! Record feed - newline-delimited JSON into record batches
//!
//! Reads one JSON object per line from stdin or files, turns each into a
//! [`Record`] keyed on its event time, and hands batches to a
//! [`BatchProcessor`] from a fixed set of concurrent workers.
//!
//! # Flow
//!
//! ```text
//! [input lines] --parse--> [Vec<Record>] --mpsc--> worker 0..N --> processor
//! ```
//!
//! Malformed lines are logged and skipped. A batch that fails delivery is
//! logged and counted; the feed keeps going. On cancellation the reader
//! stops and workers finish their current batch. Records already read but
//! not delivered (the partial batch, a batch still being queued, batches
//! left in the queue) are counted as failed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use trailpipe_config::FeedConfig;
use trailpipe_metrics::{FeedMetrics, FeedMetricsSnapshot};
use trailpipe_protocol::Record;
use trailpipe_sinks::BatchProcessor;

type BatchReceiver = Arc<Mutex<mpsc::Receiver<Vec<Record>>>>;

/// A source of newline-delimited JSON
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    /// `-` means stdin
    pub fn from_path(path: &Path) -> Self {
        if path.as_os_str() == "-" {
            Self::Stdin
        } else {
            Self::File(path.to_path_buf())
        }
    }

    /// Inputs for a list of paths; none means stdin
    pub fn from_paths(paths: &[PathBuf]) -> Vec<Self> {
        if paths.is_empty() {
            return vec![Self::Stdin];
        }
        paths.iter().map(|p| Self::from_path(p)).collect()
    }

    fn name(&self) -> String {
        match self {
            Self::Stdin => "stdin".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }

    async fn open(&self) -> Result<Box<dyn AsyncBufRead + Send + Unpin>> {
        match self {
            Self::Stdin => Ok(Box::new(BufReader::new(tokio::io::stdin()))),
            Self::File(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("failed to open input '{}'", path.display()))?;
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }
}

/// Batches records from inputs and delivers them concurrently
pub struct Feed {
    batch_size: usize,
    workers: usize,
    queue_size: usize,
    timestamp_field: String,
    processor: Arc<dyn BatchProcessor>,
    metrics: Arc<FeedMetrics>,
}

impl Feed {
    pub fn new(config: &FeedConfig, processor: Arc<dyn BatchProcessor>) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            workers: config.workers.max(1),
            queue_size: config.queue_size.max(1),
            timestamp_field: config.timestamp_field.clone(),
            processor,
            metrics: Arc::new(FeedMetrics::new()),
        }
    }

    /// Shared counters, for progress reporting
    pub fn metrics(&self) -> Arc<FeedMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Feed every input in order until exhausted or cancelled
    ///
    /// # Errors
    ///
    /// Returns an error if an input cannot be opened or read. Batches
    /// already handed to workers are still delivered.
    pub async fn run(
        &self,
        inputs: &[Input],
        cancel: &CancellationToken,
    ) -> Result<FeedMetricsSnapshot> {
        let (tx, rx, workers) = self.spawn_workers(cancel);

        let mut result = Ok(());
        for input in inputs {
            if cancel.is_cancelled() {
                break;
            }
            let name = input.name();
            info!(input = %name, "reading input");

            let read = match input.open().await {
                Ok(reader) => self.read(reader, &name, &tx, cancel).await,
                Err(e) => Err(e),
            };
            if let Err(e) = read {
                result = Err(e);
                break;
            }
        }

        drop(tx);
        self.finish(rx, workers).await;
        result.map(|()| self.metrics.snapshot())
    }

    /// Feed a single reader until EOF or cancellation
    pub async fn run_reader<R>(
        &self,
        reader: R,
        cancel: &CancellationToken,
    ) -> Result<FeedMetricsSnapshot>
    where
        R: AsyncBufRead + Send + Unpin,
    {
        let (tx, rx, workers) = self.spawn_workers(cancel);
        let result = self.read(reader, "reader", &tx, cancel).await;
        drop(tx);
        self.finish(rx, workers).await;
        result.map(|()| self.metrics.snapshot())
    }

    fn spawn_workers(
        &self,
        cancel: &CancellationToken,
    ) -> (mpsc::Sender<Vec<Record>>, BatchReceiver, Vec<JoinHandle<()>>) {
        let (tx, rx) = mpsc::channel(self.queue_size);
        let rx = Arc::new(Mutex::new(rx));

        let workers = (0..self.workers)
            .map(|id| {
                tokio::spawn(worker(
                    id,
                    Arc::clone(&rx),
                    Arc::clone(&self.processor),
                    Arc::clone(&self.metrics),
                    cancel.clone(),
                ))
            })
            .collect();

        (tx, rx, workers)
    }

    async fn finish(&self, rx: BatchReceiver, workers: Vec<JoinHandle<()>>) {
        for handle in workers {
            if let Err(e) = handle.await {
                error!(error = %e, "feed worker panicked");
            }
        }

        // only left over when workers stopped early on cancellation
        let mut rx = rx.lock().await;
        while let Ok(batch) = rx.try_recv() {
            self.abandon(&batch, "queued");
        }
    }

    async fn read<R>(
        &self,
        reader: R,
        source: &str,
        tx: &mpsc::Sender<Vec<Record>>,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        R: AsyncBufRead + Send + Unpin,
    {
        let mut lines = reader.lines();
        let mut batch = Vec::with_capacity(self.batch_size);
        let mut line_no = 0u64;

        loop {
            let line = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.abandon(&batch, "partial");
                    return Ok(());
                }
                line = lines.next_line() => line,
            };
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    self.abandon(&batch, "partial");
                    return Err(e).with_context(|| format!("failed to read input '{source}'"));
                }
            };
            let Some(line) = line else {
                break;
            };

            line_no += 1;
            self.metrics.record_line();

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match parse_record(line, &self.timestamp_field) {
                Ok(record) => {
                    self.metrics.record_accepted();
                    batch.push(record);
                }
                Err(e) => {
                    self.metrics.record_skipped();
                    warn!(input = source, line = line_no, error = %e, "skipping malformed record");
                    continue;
                }
            }

            if batch.len() >= self.batch_size {
                let full = std::mem::replace(&mut batch, Vec::with_capacity(self.batch_size));
                if !self.dispatch(full, tx, cancel).await {
                    return Ok(());
                }
            }
        }

        if !batch.is_empty() {
            self.dispatch(batch, tx, cancel).await;
        }

        debug!(input = source, lines = line_no, "input exhausted");
        Ok(())
    }

    /// Queue a batch for the workers; false once shutting down
    ///
    /// A batch that cannot be queued is counted as failed.
    async fn dispatch(
        &self,
        batch: Vec<Record>,
        tx: &mpsc::Sender<Vec<Record>>,
        cancel: &CancellationToken,
    ) -> bool {
        let records = batch.len();
        let sent = tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            sent = tx.send(batch) => sent.is_ok(),
        };

        if sent {
            self.metrics.record_dispatched();
        } else {
            self.metrics.record_failed(records as u64);
            warn!(records, stage = "queueing", "dropping undelivered batch on shutdown");
        }
        sent
    }

    /// Count read records that will never reach the processor
    fn abandon(&self, batch: &[Record], stage: &'static str) {
        if batch.is_empty() {
            return;
        }
        self.metrics.record_failed(batch.len() as u64);
        warn!(records = batch.len(), stage, "dropping undelivered batch on shutdown");
    }
}

async fn worker(
    id: usize,
    rx: BatchReceiver,
    processor: Arc<dyn BatchProcessor>,
    metrics: Arc<FeedMetrics>,
    cancel: CancellationToken,
) {
    loop {
        let batch = {
            let mut rx = rx.lock().await;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                batch = rx.recv() => batch,
            }
        };
        let Some(batch) = batch else {
            break;
        };

        match processor.process(&batch).await {
            Ok(()) => metrics.record_delivered(),
            Err(e) => {
                metrics.record_failed(e.records as u64);
                error!(worker = id, records = e.records, error = %e, "batch delivery failed");
            }
        }
    }

    debug!(worker = id, "feed worker stopped");
}

/// Parse one line into a record
fn parse_record(line: &str, timestamp_field: &str) -> Result<Record> {
    let value: serde_json::Value = serde_json::from_str(line).context("invalid JSON")?;
    Ok(Record::from_value(value, timestamp_field)?)
}

#[cfg(test)]
#[path = "feed_test.rs"]
mod feed_test;
