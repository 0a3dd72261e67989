//! trailpipe Protocol - Core record types for the trailpipe sink
//!
//! This crate provides the types that flow from the source feed to the
//! queue backend:
//! - `Record` - One decoded audit-log entry with its event timestamp
//! - `NormalizedRecord` - Record stamped with Logstash schema fields
//! - `LogstashEncoder` - Pure `Record -> NormalizedRecord` transform
//! - `WireMessage` - JSON text ready for transport
//! - `JsonSerializer` - `NormalizedRecord -> WireMessage` with size limit
//!
//! # Pipeline
//!
//! ```text
//! [Record] --encode--> [NormalizedRecord] --serialize--> [WireMessage]
//! ```
//!
//! # Wire Format
//!
//! Every message is one JSON object holding all of the record's fields plus:
//!
//! | Field | Value |
//! |-------|-------|
//! | `@version` | integer `1` |
//! | `@timestamp` | UTC `yyyy-MM-ddTHH:mm:ss.SSSZ` |
//! | `type` | configured type tag, omitted when unset |
//!
//! # Example
//!
//! ```
//! use trailpipe_protocol::{JsonSerializer, LogstashEncoder, Record};
//!
//! let value = serde_json::json!({"eventTime": "2021-01-01T00:00:00Z", "foo": "bar"});
//! let record = Record::from_value(value, "eventTime").unwrap();
//!
//! let encoder = LogstashEncoder::new(Some("cloudtrail".to_string()));
//! let normalized = encoder.encode(&record);
//! let message = JsonSerializer::default().serialize(&normalized).unwrap();
//!
//! assert!(message.as_str().contains("\"@version\":1"));
//! ```

mod encode;
mod error;
mod record;
mod serialize;

pub use encode::{
    LogstashEncoder, NormalizedRecord, SCHEMA_VERSION, TIMESTAMP_FIELD, TYPE_FIELD,
    VERSION_FIELD, format_timestamp,
};
pub use error::{ProtocolError, SerializationError};
pub use record::{Fields, Record, parse_timestamp};
pub use serialize::{DEFAULT_MAX_MESSAGE_BYTES, JsonSerializer, WireMessage};

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Default name of the field holding a record's event time
pub const DEFAULT_TIMESTAMP_FIELD: &str = "eventTime";

#[cfg(test)]
mod error_test;
#[cfg(test)]
mod record_test;
