//! Decoded audit-log record
//!
//! A `Record` is an ordered mapping of field names to JSON values plus the
//! event timestamp the source feed extracted from it. Field order is the
//! order the feed decoded them in and is preserved on the wire.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::ProtocolError;

/// Ordered field mapping of a record
pub type Fields = Map<String, Value>;

/// One structured audit-log entry as delivered by the source feed
///
/// Records are immutable once handed to the encoder. The feed may shape a
/// record before delivery through [`Record::fields_mut`].
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Fields,
    event_time: DateTime<Utc>,
}

impl Record {
    /// Create a record from already-decoded fields and an event time
    pub fn new(fields: Fields, event_time: DateTime<Utc>) -> Self {
        Self { fields, event_time }
    }

    /// Create a record, reading the event time from `timestamp_field`
    ///
    /// # Errors
    ///
    /// Returns an error if the field is absent, is not a string, or is not
    /// an RFC 3339 timestamp.
    pub fn from_fields(fields: Fields, timestamp_field: &str) -> Result<Self, ProtocolError> {
        let raw = fields
            .get(timestamp_field)
            .ok_or_else(|| ProtocolError::missing_timestamp(timestamp_field))?;

        let event_time = raw
            .as_str()
            .and_then(parse_timestamp)
            .ok_or_else(|| ProtocolError::invalid_timestamp(timestamp_field, raw.to_string()))?;

        Ok(Self { fields, event_time })
    }

    /// Create a record from a decoded JSON value
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an object or its timestamp
    /// field is missing or malformed.
    pub fn from_value(value: Value, timestamp_field: &str) -> Result<Self, ProtocolError> {
        match value {
            Value::Object(fields) => Self::from_fields(fields, timestamp_field),
            other => Err(ProtocolError::NotAnObject(value_kind(&other))),
        }
    }

    /// All fields of the record
    #[inline]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Mutable view of all fields of the record
    #[inline]
    pub fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    /// Get a single field
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Event time of the record
    #[inline]
    pub fn event_time(&self) -> DateTime<Utc> {
        self.event_time
    }

    /// Number of fields
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consume the record, returning its fields
    pub fn into_fields(self) -> Fields {
        self.fields
    }
}

/// Parse an RFC 3339 timestamp into UTC
///
/// Accepts any offset and fractional precision, e.g. CloudTrail's
/// `2021-01-01T00:00:00Z`.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
