//! Tests for protocol error types

use crate::error::{ProtocolError, SerializationError};

#[test]
fn test_error_creation_missing_timestamp() {
    let err = ProtocolError::missing_timestamp("eventTime");
    assert!(matches!(err, ProtocolError::MissingTimestamp(ref f) if f == "eventTime"));
}

#[test]
fn test_error_creation_invalid_timestamp() {
    let err = ProtocolError::invalid_timestamp("eventTime", "yesterday");
    assert!(matches!(
        err,
        ProtocolError::InvalidTimestamp { ref field, ref value }
            if field == "eventTime" && value == "yesterday"
    ));
}

#[test]
fn test_error_display_messages() {
    let err = ProtocolError::NotAnObject("array");
    assert!(err.to_string().contains("JSON object"));
    assert!(err.to_string().contains("array"));

    let err = ProtocolError::missing_timestamp("eventTime");
    assert!(err.to_string().contains("eventTime"));

    let err = ProtocolError::invalid_timestamp("eventTime", "42");
    assert!(err.to_string().contains("42"));
}

#[test]
fn test_serialization_too_large() {
    let err = SerializationError::too_large(2048, 1024);
    assert!(matches!(
        err,
        SerializationError::TooLarge {
            size: 2048,
            max: 1024
        }
    ));
    assert!(err.to_string().contains("2048"));
    assert!(err.to_string().contains("1024"));
}
