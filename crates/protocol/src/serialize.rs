//! JSON wire serializer
//!
//! Turns normalized records into the UTF-8 JSON text pushed to the queue.

use std::fmt;

use crate::encode::NormalizedRecord;
use crate::error::SerializationError;

/// Largest value Redis accepts for a single list element (512 MiB)
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 512 * 1024 * 1024;

/// Serialized form of one normalized record
///
/// Always a valid JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireMessage(String);

impl WireMessage {
    /// Message text
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Message bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the message is empty (never true for serializer output)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the message, returning its text
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for WireMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WireMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compact JSON serializer with a per-message size limit
#[derive(Debug, Clone, Copy)]
pub struct JsonSerializer {
    max_message_bytes: usize,
}

impl Default for JsonSerializer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGE_BYTES)
    }
}

impl JsonSerializer {
    /// Create a serializer rejecting messages larger than `max_message_bytes`
    pub fn new(max_message_bytes: usize) -> Self {
        Self { max_message_bytes }
    }

    /// Configured size limit
    pub fn max_message_bytes(&self) -> usize {
        self.max_message_bytes
    }

    /// Serialize a normalized record
    ///
    /// # Errors
    ///
    /// Returns an error if JSON encoding fails or the encoded message is
    /// larger than the size limit.
    pub fn serialize(&self, record: &NormalizedRecord) -> Result<WireMessage, SerializationError> {
        let text = serde_json::to_string(record.fields())?;

        if text.len() > self.max_message_bytes {
            return Err(SerializationError::too_large(
                text.len(),
                self.max_message_bytes,
            ));
        }

        Ok(WireMessage(text))
    }
}
