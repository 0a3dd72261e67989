//! Common types shared by the feed and every sink

use std::error::Error as StdError;

use async_trait::async_trait;
use thiserror::Error;
use trailpipe_protocol::Record;

/// Consumer of ordered record batches
///
/// Implementations borrow the batch for the duration of one call and may
/// be invoked concurrently from several feed workers.
#[async_trait]
pub trait BatchProcessor: Send + Sync {
    /// Deliver one batch
    ///
    /// # Errors
    ///
    /// Returns a [`CallbackError`] when the batch could not be delivered.
    /// Records skipped because they could not be serialized are not an
    /// error.
    async fn process(&self, batch: &[Record]) -> Result<(), CallbackError>;
}

/// Failure reported back to the feed for one batch
#[derive(Debug, Error)]
#[error("failed to process batch of {records} records: {source}")]
pub struct CallbackError {
    /// Number of records in the failed batch
    pub records: usize,

    /// Underlying sink error
    #[source]
    pub source: Box<dyn StdError + Send + Sync>,
}

impl CallbackError {
    /// Wrap a sink error for a batch of `records` records
    pub fn new(records: usize, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            records,
            source: source.into(),
        }
    }

    /// Downcast the underlying error to a concrete sink error type
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.source.downcast_ref::<E>()
    }
}
