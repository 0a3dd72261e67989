//! Protocol error types
//!
//! Errors raised while building records from decoded input and while
//! serializing normalized records to wire messages.

use thiserror::Error;

/// Errors that can occur while constructing a `Record`
///
/// These are input-contract violations owned by the source feed. The
/// encoder itself never fails.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Decoded input is not a JSON object
    #[error("record must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// Timestamp field is absent
    #[error("missing timestamp field '{0}'")]
    MissingTimestamp(String),

    /// Timestamp field is present but not an RFC 3339 string
    #[error("invalid timestamp in field '{field}': {value}")]
    InvalidTimestamp { field: String, value: String },
}

impl ProtocolError {
    /// Create a missing timestamp error
    #[inline]
    pub fn missing_timestamp(field: impl Into<String>) -> Self {
        Self::MissingTimestamp(field.into())
    }

    /// Create an invalid timestamp error
    #[inline]
    pub fn invalid_timestamp(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Errors that can occur while serializing a normalized record
///
/// A serialization failure affects only the one record; sinks log it and
/// drop the record from the write batch.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// JSON encoding failed
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Encoded message exceeds the backend's size limit
    #[error("message too large: {size} bytes exceeds maximum {max}")]
    TooLarge { size: usize, max: usize },
}

impl SerializationError {
    /// Create a message too large error
    #[inline]
    pub fn too_large(size: usize, max: usize) -> Self {
        Self::TooLarge { size, max }
    }
}
