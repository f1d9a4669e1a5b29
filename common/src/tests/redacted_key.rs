// Unit tests for RedactedApiKey.
// The invariant under test: the raw key value never escapes through
// Debug, Display, or serde.

use crate::RedactedApiKey;

#[test]
fn given_key_when_debug_formatted_then_value_is_redacted() {
    let key = RedactedApiKey::new("sk-super-secret-value".to_string());

    let debug = format!("{key:?}");

    assert!(!debug.contains("sk-super-secret-value"));
    assert!(debug.contains("REDACTED"));
}

#[test]
fn given_key_when_display_formatted_then_value_is_redacted() {
    let key = RedactedApiKey::new("sk-super-secret-value".to_string());

    let display = format!("{key}");

    assert!(!display.contains("sk-super-secret-value"));
    assert!(display.contains("REDACTED"));
}

#[test]
fn given_key_when_serialized_then_serialization_is_refused() {
    let key = RedactedApiKey::new("sk-super-secret-value".to_string());

    let result = serde_json::to_string(&key);

    assert!(result.is_err(), "serializing a credential must fail");
    let message = result.unwrap_err().to_string();
    assert!(!message.contains("sk-super-secret-value"));
}

#[test]
fn given_equal_keys_when_compared_then_they_are_equal() {
    let a = RedactedApiKey::from("sk-same-key-0123456789");
    let b = RedactedApiKey::from("sk-same-key-0123456789");
    let c = RedactedApiKey::from("sk-other-key-987654321");

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn given_key_with_spaces_when_checked_then_whitespace_is_detected() {
    assert!(RedactedApiKey::from("sk bad key").contains_whitespace());
    assert!(!RedactedApiKey::from("sk-good-key").contains_whitespace());
}

#[test]
fn given_key_when_transmitting_then_as_str_exposes_value() {
    let key = RedactedApiKey::from("sk-transmit-me");

    assert_eq!(key.as_str(), "sk-transmit-me");
    assert_eq!(key.len(), 14);
    assert!(!key.is_empty());
}
