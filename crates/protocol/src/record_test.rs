//! Tests for the record type

use chrono::{TimeZone, Utc};
use serde_json::{Value, json};

use crate::error::ProtocolError;
use crate::record::{Fields, Record, parse_timestamp};

fn object(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

#[test]
fn test_from_fields_reads_event_time() {
    let fields = object(json!({"eventTime": "2021-01-01T00:00:00Z", "eventName": "PutObject"}));
    let record = Record::from_fields(fields, "eventTime").unwrap();

    assert_eq!(
        record.event_time(),
        Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()
    );
    assert_eq!(record.len(), 2);
    assert_eq!(record.get("eventName"), Some(&json!("PutObject")));
}

#[test]
fn test_from_fields_custom_timestamp_field() {
    let fields = object(json!({"ts": "2020-06-15T12:30:45.250+02:00"}));
    let record = Record::from_fields(fields, "ts").unwrap();

    let expected = Utc.with_ymd_and_hms(2020, 6, 15, 10, 30, 45).unwrap()
        + chrono::Duration::milliseconds(250);
    assert_eq!(record.event_time(), expected);
}

#[test]
fn test_from_fields_missing_timestamp() {
    let fields = object(json!({"eventName": "PutObject"}));
    let err = Record::from_fields(fields, "eventTime").unwrap_err();
    assert!(matches!(err, ProtocolError::MissingTimestamp(ref f) if f == "eventTime"));
}

#[test]
fn test_from_fields_malformed_timestamp() {
    let fields = object(json!({"eventTime": "not a time"}));
    let err = Record::from_fields(fields, "eventTime").unwrap_err();
    assert!(matches!(err, ProtocolError::InvalidTimestamp { .. }));
}

#[test]
fn test_from_fields_non_string_timestamp() {
    let fields = object(json!({"eventTime": 1609459200}));
    let err = Record::from_fields(fields, "eventTime").unwrap_err();
    assert!(matches!(err, ProtocolError::InvalidTimestamp { ref value, .. } if value == "1609459200"));
}

#[test]
fn test_from_value_rejects_non_objects() {
    let err = Record::from_value(json!([1, 2, 3]), "eventTime").unwrap_err();
    assert!(matches!(err, ProtocolError::NotAnObject("array")));

    let err = Record::from_value(json!("text"), "eventTime").unwrap_err();
    assert!(matches!(err, ProtocolError::NotAnObject("string")));
}

#[test]
fn test_field_order_preserved() {
    let record = Record::from_value(
        json!({"zeta": 1, "eventTime": "2021-01-01T00:00:00Z", "alpha": 2}),
        "eventTime",
    )
    .unwrap();

    let keys: Vec<&str> = record.fields().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["zeta", "eventTime", "alpha"]);
}

#[test]
fn test_fields_mut() {
    let mut record =
        Record::from_value(json!({"eventTime": "2021-01-01T00:00:00Z"}), "eventTime").unwrap();

    record
        .fields_mut()
        .insert("awsRegion".into(), json!("us-east-1"));

    assert_eq!(record.get("awsRegion"), Some(&json!("us-east-1")));
    assert_eq!(record.into_fields().len(), 2);
}

#[test]
fn test_parse_timestamp_variants() {
    assert!(parse_timestamp("2021-01-01T00:00:00Z").is_some());
    assert!(parse_timestamp("2021-01-01T00:00:00.123Z").is_some());
    assert!(parse_timestamp("2021-01-01T00:00:00+05:30").is_some());
    assert!(parse_timestamp("2021-01-01").is_none());
    assert!(parse_timestamp("").is_none());
}
