//! Unit tests for the Redis attempt store key layout and encoding

use chrono::{TimeZone, Utc};

use og_core::domain::entities::{AttemptEvent, AttemptKind, AttemptRecord, RequestMetadata};
use og_core::domain::value_objects::Identifier;
use og_core::errors::StorageError;

use crate::store::redis_attempt_store::{attempt_key, decode_record, encode_record};

fn phone() -> Identifier {
    Identifier::parse("+15550100").unwrap()
}

#[test]
fn test_key_uses_hash_not_phone() {
    let key = attempt_key(&phone());

    assert!(key.starts_with("otp_attempts:"));
    assert_eq!(key.len(), "otp_attempts:".len() + 64);
    assert!(!key.contains("15550100"));
    assert_eq!(key, attempt_key(&Identifier::parse("+1 555 0100").unwrap()));
}

#[test]
fn test_record_encoding_is_camel_case_json() {
    let mut record = AttemptRecord::new(phone());
    let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    record.attempt_count = 1;
    record.window_started_at = Some(at);
    record.last_attempt_at = Some(at);
    record.push_event(
        AttemptEvent::new(at, AttemptKind::Initial, &RequestMetadata::new("10.0.0.1", "ua")),
        20,
    );

    let json: serde_json::Value = serde_json::from_str(&encode_record(&record).unwrap()).unwrap();
    assert_eq!(json["attemptCount"], 1);
    assert_eq!(json["adminBlocked"], false);
    assert_eq!(json["history"][0]["kind"], "initial");
    assert_eq!(json["history"][0]["sourceIP"], "10.0.0.1");

    let decoded = decode_record(&encode_record(&record).unwrap()).unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn test_corrupt_payload_is_serialization_error() {
    let err = decode_record("{not json").unwrap_err();
    assert!(matches!(err, StorageError::Serialization { .. }));
}

#[test]
fn test_invalid_identifier_in_payload_is_rejected() {
    let raw = r#"{"identifier":"nope","attemptCount":0,"windowStartedAt":null,"lastAttemptAt":null,"lockedUntil":null}"#;
    assert!(decode_record(raw).is_err());
}
