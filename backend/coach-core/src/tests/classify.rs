// Unit tests for the error classifier's rule ordering.
// Transport-level failures (connection refused, timeouts) need a live
// socket to produce, so those paths are covered by the integration tests;
// here we exercise the status, decode, and request rules.

use crate::api_client::classify::{ErrorKind, classify};
use crate::api_client::retry::RetryPolicy;
use crate::api_client::transport::SendFailure;

use std::time::Duration;

fn default_policy() -> RetryPolicy {
    RetryPolicy::default()
}

fn status_failure(status: u16) -> SendFailure {
    SendFailure::Status {
        status,
        body: String::new(),
    }
}

#[test]
fn given_retryable_statuses_when_classified_then_server_kind_and_retryable() {
    let policy = default_policy();
    for status in [408, 429, 500, 502, 503, 504] {
        let classified = classify(&status_failure(status), &policy);
        assert_eq!(classified.kind, ErrorKind::Server(status));
        assert!(classified.retryable, "{status} must be retryable");
    }
}

#[test]
fn given_terminal_4xx_when_classified_then_client_kind_and_not_retryable() {
    let policy = default_policy();
    for status in [400, 401, 403, 404, 413] {
        let classified = classify(&status_failure(status), &policy);
        assert_eq!(classified.kind, ErrorKind::Client(status));
        assert!(!classified.retryable, "{status} must not be retried");
    }
}

#[test]
fn given_5xx_outside_retryable_set_when_classified_then_not_retryable() {
    let classified = classify(&status_failure(501), &default_policy());
    assert_eq!(classified.kind, ErrorKind::Client(501));
    assert!(!classified.retryable);
}

#[test]
fn given_custom_retryable_set_when_classified_then_policy_set_wins() {
    let narrow = RetryPolicy::new(
        3,
        Duration::from_millis(10),
        Duration::from_millis(100),
        [503],
    );

    let on_list = classify(&status_failure(503), &narrow);
    assert_eq!(on_list.kind, ErrorKind::Server(503));
    assert!(on_list.retryable);

    // 500 is retryable by default, but this policy removed it
    let off_list = classify(&status_failure(500), &narrow);
    assert_eq!(off_list.kind, ErrorKind::Client(500));
    assert!(!off_list.retryable);
}

#[test]
fn given_status_outside_error_ranges_when_classified_then_unknown() {
    let classified = classify(&status_failure(302), &default_policy());
    assert_eq!(classified.kind, ErrorKind::Unknown);
    assert!(!classified.retryable);
}

#[test]
fn given_undecodable_success_body_when_classified_then_terminal_validation() {
    let failure = SendFailure::Decode {
        detail: "expected value at line 1 column 1".to_string(),
    };

    let classified = classify(&failure, &default_policy());

    assert_eq!(classified.kind, ErrorKind::Validation);
    assert!(
        !classified.retryable,
        "a contract violation cannot be fixed by retrying"
    );
    assert!(classified.detail.contains("not valid JSON"));
}

#[test]
fn given_request_construction_failure_when_classified_then_unknown_terminal() {
    let failure = SendFailure::Request {
        detail: "could not build request URL for endpoint 'api/v1/explain'".to_string(),
    };

    let classified = classify(&failure, &default_policy());

    assert_eq!(classified.kind, ErrorKind::Unknown);
    assert!(!classified.retryable);
}

#[test]
fn given_body_snippet_when_classified_then_detail_carries_it() {
    let failure = SendFailure::Status {
        status: 503,
        body: "{\"message\":\"maintenance window\"}".to_string(),
    };

    let classified = classify(&failure, &default_policy());

    assert!(classified.detail.contains("503"));
    assert!(classified.detail.contains("maintenance window"));
}
