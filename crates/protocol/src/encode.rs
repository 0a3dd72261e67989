//! Logstash event encoder
//!
//! Stamps records with the Logstash 1.2 event schema: `@version`,
//! `@timestamp`, and an optional `type` tag. The added fields always
//! overwrite same-named fields already present in the record.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::record::{Fields, Record};

/// Logstash schema version written to `@version`
pub const SCHEMA_VERSION: u64 = 1;

/// Schema version field name
pub const VERSION_FIELD: &str = "@version";

/// Event timestamp field name
pub const TIMESTAMP_FIELD: &str = "@timestamp";

/// Event type field name
pub const TYPE_FIELD: &str = "type";

/// Millisecond precision, always UTC with a literal `Z`
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Format a timestamp as `yyyy-MM-ddTHH:mm:ss.SSSZ`
#[inline]
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// A record enriched with Logstash schema fields
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    fields: Fields,
    event_time: DateTime<Utc>,
}

impl NormalizedRecord {
    /// All fields, including the schema fields
    #[inline]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Get a single field
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Event time the record was stamped with
    #[inline]
    pub fn event_time(&self) -> DateTime<Utc> {
        self.event_time
    }

    /// Consume the record, returning its fields
    pub fn into_fields(self) -> Fields {
        self.fields
    }
}

impl From<NormalizedRecord> for Record {
    fn from(normalized: NormalizedRecord) -> Self {
        Record::new(normalized.fields, normalized.event_time)
    }
}

/// Encodes records as Logstash events
///
/// Stateless apart from the configured type tag, so a single encoder can be
/// shared by any number of concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct LogstashEncoder {
    type_tag: Option<String>,
}

impl LogstashEncoder {
    /// Create an encoder
    ///
    /// An empty type tag is treated the same as no tag: the `type` field
    /// is not written.
    pub fn new(type_tag: Option<String>) -> Self {
        Self {
            type_tag: type_tag.filter(|tag| !tag.is_empty()),
        }
    }

    /// Configured type tag, if any
    pub fn type_tag(&self) -> Option<&str> {
        self.type_tag.as_deref()
    }

    /// Encode a record
    ///
    /// Never fails and never mutates the input.
    pub fn encode(&self, record: &Record) -> NormalizedRecord {
        let mut fields = record.fields().clone();

        fields.insert(VERSION_FIELD.to_string(), Value::from(SCHEMA_VERSION));
        fields.insert(
            TIMESTAMP_FIELD.to_string(),
            Value::String(format_timestamp(record.event_time())),
        );
        if let Some(ref tag) = self.type_tag {
            fields.insert(TYPE_FIELD.to_string(), Value::String(tag.clone()));
        }

        NormalizedRecord {
            fields,
            event_time: record.event_time(),
        }
    }
}
