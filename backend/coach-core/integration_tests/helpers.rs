use coach_core::{CoachApiClient, CoachConfig, RetryPolicy};

use std::time::Duration;

use serde_json::{Value, json};

pub const TEST_API_KEY: &str = "test-key-0123456789";

/// Policy with the production shape but millisecond delays, so retry
/// tests finish fast.
pub fn fast_policy() -> RetryPolicy {
    RetryPolicy::new(
        4,
        Duration::from_millis(10),
        Duration::from_millis(40),
        [408, 429, 500, 502, 503, 504],
    )
}

pub fn test_config(base_url: &str) -> CoachConfig {
    CoachConfig::new(base_url, TEST_API_KEY)
}

pub fn test_client(base_url: &str) -> CoachApiClient {
    CoachApiClient::with_policy(&test_config(base_url), fast_policy())
        .expect("test config must be valid")
}

/// Canonical contract-conforming explain payload.
pub fn explanation_body() -> Value {
    json!({
        "type": "explain",
        "summary": "s",
        "lineByLine": [
            {"lineOffset": 0, "code": "print(1)", "explanation": "e"}
        ]
    })
}

/// Canonical contract-conforming review payload.
pub fn review_body() -> Value {
    json!({
        "type": "review",
        "summary": "s",
        "goodPoints": ["g"],
        "improvementPoints": ["i"],
        "improvements": [
            {"description": "d", "reasoning": "r"}
        ]
    })
}

/// Canonical contract-conforming explain-error payload.
pub fn error_body() -> Value {
    json!({
        "type": "error",
        "errorMeaning": "m",
        "whyHere": "w",
        "howToFix": "f"
    })
}
