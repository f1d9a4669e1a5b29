// Unit tests for config validation.

use crate::config::{CoachConfig, UserLevel};
use crate::error::config::ConfigError;

fn valid_config() -> CoachConfig {
    CoachConfig::new("https://api.flowpilot.dev", "sk-0123456789abcdef")
}

fn expect_reason(result: Result<(), ConfigError>) -> String {
    match result {
        Err(ConfigError::Validation { reason, .. }) => reason,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn given_valid_config_when_validated_then_accepted() {
    assert!(valid_config().validate().is_ok());
}

#[test]
fn given_empty_base_url_when_validated_then_rejected() {
    let mut config = valid_config();
    config.api_base_url = String::new();

    let reason = expect_reason(config.validate());
    assert!(reason.contains("base URL"));
}

#[test]
fn given_unparseable_base_url_when_validated_then_rejected() {
    let mut config = valid_config();
    config.api_base_url = "not a url".to_string();

    let reason = expect_reason(config.validate());
    assert!(reason.contains("Invalid API base URL"));
}

#[test]
fn given_unsupported_scheme_when_validated_then_rejected() {
    let mut config = valid_config();
    config.api_base_url = "ftp://api.flowpilot.dev".to_string();

    let reason = expect_reason(config.validate());
    assert!(reason.contains("ftp"));
    assert!(reason.contains("http"));
}

#[test]
fn given_local_http_url_when_validated_then_accepted() {
    let mut config = valid_config();
    config.api_base_url = "http://127.0.0.1:8080".to_string();

    assert!(config.validate().is_ok());
}

#[test]
fn given_missing_api_key_when_validated_then_rejected_with_safe_reason() {
    let mut config = valid_config();
    config.api_key = "".into();

    let reason = expect_reason(config.validate());
    assert!(reason.contains("API key is required"));
}

#[test]
fn given_short_api_key_when_validated_then_rejected_without_leaking_it() {
    let mut config = valid_config();
    config.api_key = "sk-tiny".into();

    let reason = expect_reason(config.validate());
    assert!(reason.contains("too short"));
    assert!(!reason.contains("sk-tiny"), "the key itself must not appear");
}

#[test]
fn given_api_key_with_spaces_when_validated_then_rejected() {
    let mut config = valid_config();
    config.api_key = "sk-0123 456789".into();

    let reason = expect_reason(config.validate());
    assert!(reason.contains("whitespace"));
}

#[test]
fn given_demo_mode_when_validated_then_api_key_not_required() {
    let config = CoachConfig::new("https://api.flowpilot.dev", "").with_demo_mode(true);

    assert!(config.validate().is_ok());
}

#[test]
fn given_builder_defaults_then_beginner_with_telemetry() {
    let config = valid_config();
    assert_eq!(config.user_level, UserLevel::Beginner);
    assert!(config.telemetry_enabled);
    assert!(!config.demo_mode);

    let adjusted = config
        .with_user_level(UserLevel::Intermediate)
        .with_telemetry_enabled(false);
    assert_eq!(adjusted.user_level, UserLevel::Intermediate);
    assert!(!adjusted.telemetry_enabled);
}
