use crate::helpers::{
    TEST_API_KEY, error_body, explanation_body, review_body, test_client, test_config,
};

use coach_core::protocol::{
    ErrorExplainRequest, ExplainRequest, ReviewRequest, ReviewType, SourceRange,
};
use coach_core::{ApiClient, ApiError, CoachApiClient, UserLevel};

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// End-to-end behavior of the request executor against a real HTTP server.
// Attempt counts are asserted through wiremock's expect() verification,
// which panics on drop if the mock was hit the wrong number of times.
// ============================================================================

/// **VALUE**: Verifies the happy path produces a typed result from raw JSON.
///
/// **WHY THIS MATTERS**: This is the primary user flow; the typed
/// `Explanation` is what every downstream UI surface consumes.
///
/// **BUG THIS CATCHES**: Would catch a broken endpoint path, a serde rename
/// mismatch between the wire format and our structs, or a validator that
/// rejects conforming payloads.
#[tokio::test]
async fn given_valid_response_when_explain_called_then_typed_explanation_returned() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/explain"))
        .and(body_partial_json(json!({
            "code": "print(1)",
            "languageId": "python",
            "userLevel": "beginner"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(explanation_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let explanation = client
        .explain_selection(&ExplainRequest::new("print(1)", "python"))
        .await
        .expect("conforming response must succeed");

    assert_eq!(explanation.summary, "s");
    assert_eq!(explanation.line_by_line.len(), 1);
    assert_eq!(explanation.line_by_line[0].line_offset, 0);
    assert_eq!(explanation.line_by_line[0].code, "print(1)");
}

/// **VALUE**: Verifies the fixed headers reach the wire on every call.
///
/// **WHY THIS MATTERS**: The backend authenticates via the bearer header
/// and rate-limits per client identifier; omitting either breaks every
/// user at once.
///
/// **BUG THIS CATCHES**: Would catch a client rebuild that drops default
/// headers, or a credential that stops being attached after refactoring.
#[tokio::test]
async fn given_any_request_when_sent_then_auth_and_identity_headers_present() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/explain"))
        .and(header("Authorization", format!("Bearer {TEST_API_KEY}").as_str()))
        .and(header("User-Agent", coach_core::USER_AGENT))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(explanation_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client
        .explain_selection(&ExplainRequest::new("print(1)", "python"))
        .await
        .expect("headers must match");
}

/// **VALUE**: Verifies transient server failures are retried to success.
///
/// **WHY THIS MATTERS**: Backends restart and load-shed routinely; a user
/// should never see an error for a blip one retry would have absorbed.
///
/// **BUG THIS CATCHES**: Would catch a classifier that marks 503 terminal,
/// or a retry loop that gives up after the first failure.
#[tokio::test]
async fn given_transient_503_when_explain_called_then_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/explain"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/explain"))
        .respond_with(ResponseTemplate::new(200).set_body_json(explanation_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client
        .explain_selection(&ExplainRequest::new("print(1)", "python"))
        .await;

    assert!(result.is_ok(), "second attempt should have succeeded");
}

/// **VALUE**: Verifies the attempt cap bounds a persistently failing backend.
///
/// **WHY THIS MATTERS**: Without the cap, a dead backend would hold every
/// operation open forever; with it, the user gets an actionable error after
/// a bounded number of attempts.
///
/// **BUG THIS CATCHES**: Would catch an off-by-one in the retry loop (3 or 5
/// attempts instead of 4) and a terminal message that stops telling users
/// what to do next.
#[tokio::test]
async fn given_persistent_500_when_explain_called_then_server_error_after_max_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/explain"))
        .respond_with(ResponseTemplate::new(500))
        .expect(4)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let error = client
        .explain_selection(&ExplainRequest::new("print(1)", "python"))
        .await
        .expect_err("persistent 500 must be terminal");

    match error {
        ApiError::Server { status, ref message, .. } => {
            assert_eq!(status, 500);
            assert!(message.contains("try again"));
            assert!(message.contains("4 attempts"));
        }
        other => panic!("expected a server error, got {other:?}"),
    }
}

/// **VALUE**: Verifies rate limiting is retried like any transient failure.
///
/// **WHY THIS MATTERS**: 429 is a 4xx, but it is explicitly transient;
/// treating it as terminal would punish users for the backend's own
/// throttling.
///
/// **BUG THIS CATCHES**: Would catch a classifier that lumps 429 in with
/// the terminal 4xx range.
#[tokio::test]
async fn given_429_then_200_when_review_called_then_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/review"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/review"))
        .respond_with(ResponseTemplate::new(200).set_body_json(review_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let review = client
        .review_selection(&ReviewRequest {
            code: "x = 1".to_string(),
            language_id: "python".to_string(),
            file_path: None,
            review_type: ReviewType::Quality,
        })
        .await
        .expect("retry should have absorbed the 429");

    assert_eq!(review.improvements.len(), 1);
}

/// **VALUE**: Verifies a deterministic rejection is never retried.
///
/// **WHY THIS MATTERS**: Retrying a 401 hammers a backend that has already
/// made up its mind and delays the user's fix (their API key) by the whole
/// backoff schedule.
///
/// **BUG THIS CATCHES**: Would catch a classifier regression that starts
/// retrying terminal 4xx statuses, and an auth message that stops pointing
/// at the credential - or worse, starts including it.
#[tokio::test]
async fn given_401_when_explain_called_then_single_attempt_and_credential_safe_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/explain"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let error = client
        .explain_selection(&ExplainRequest::new("print(1)", "python"))
        .await
        .expect_err("401 must be terminal");

    match error {
        ApiError::Client { status, ref message, .. } => {
            assert_eq!(status, 401);
            assert!(message.contains("API key"));
            assert!(!message.contains(TEST_API_KEY));
        }
        other => panic!("expected a client error, got {other:?}"),
    }
    assert!(!error.to_string().contains(TEST_API_KEY));
}

/// **VALUE**: Verifies payload-too-large gets its specific guidance.
///
/// **WHY THIS MATTERS**: 413 has a user-side fix (select less code); a
/// generic message would leave users stuck.
///
/// **BUG THIS CATCHES**: Would catch the status-specific message table
/// losing its 413 entry.
#[tokio::test]
async fn given_413_when_explain_called_then_smaller_selection_suggested() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/explain"))
        .respond_with(ResponseTemplate::new(413))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let error = client
        .explain_selection(&ExplainRequest::new("print(1)", "python"))
        .await
        .expect_err("413 must be terminal");

    assert!(error.message().contains("smaller"));
}

/// **VALUE**: Verifies a contract-violating 2xx payload fails fast.
///
/// **WHY THIS MATTERS**: A malformed success payload means the backend
/// broke its contract; retrying cannot fix that, and each extra attempt
/// would just delay the (actionable) diagnostic.
///
/// **BUG THIS CATCHES**: Would catch validation failures being routed into
/// the retry loop, and diagnostics losing the field name that makes them
/// debuggable.
#[tokio::test]
async fn given_malformed_payload_when_explain_called_then_validation_failure_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/explain"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "explain",
            "summary": "x",
            "lineByLine": "not-an-array"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let error = client
        .explain_selection(&ExplainRequest::new("print(1)", "python"))
        .await
        .expect_err("malformed payload must fail validation");

    match error {
        ApiError::Validation { ref message, .. } => {
            assert!(message.contains("lineByLine"));
            assert!(message.contains("array"));
        }
        other => panic!("expected a validation failure, got {other:?}"),
    }
}

/// **VALUE**: Verifies the discriminant check catches cross-wired responses.
///
/// **WHY THIS MATTERS**: A review payload answering an explain call means
/// the backend (or a proxy) is misrouting; silently decoding it would hand
/// the UI the wrong shape entirely.
///
/// **BUG THIS CATCHES**: Would catch a validator that checks fields but not
/// the `type` tag, and a diagnostic that fails to name both tags.
#[tokio::test]
async fn given_review_payload_for_explain_call_then_validation_cites_both_tags() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/explain"))
        .respond_with(ResponseTemplate::new(200).set_body_json(review_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let error = client
        .explain_selection(&ExplainRequest::new("print(1)", "python"))
        .await
        .expect_err("tag mismatch must fail validation");

    let message = error.message().to_string();
    assert!(message.contains("'explain'"));
    assert!(message.contains("'review'"));
}

/// **VALUE**: Verifies an unreachable backend surfaces as a network error.
///
/// **WHY THIS MATTERS**: Connection refused is the most common failure in
/// the field (offline, VPN, firewall); it must come back as a connectivity
/// message, not a panic or an opaque wrapped exception.
///
/// **BUG THIS CATCHES**: Would catch raw reqwest errors leaking to callers
/// and the network message losing its connectivity guidance.
#[tokio::test]
async fn given_unreachable_server_when_explain_called_then_network_error() {
    let config = test_config("http://127.0.0.1:9");
    let policy = coach_core::RetryPolicy::new(
        2,
        Duration::from_millis(5),
        Duration::from_millis(10),
        [503],
    );
    let client = CoachApiClient::with_policy(&config, policy).expect("config is valid");

    let error = client
        .explain_selection(&ExplainRequest::new("print(1)", "python"))
        .await
        .expect_err("nothing listens on port 9");

    match error {
        ApiError::Network { ref message, .. } => {
            assert!(message.contains("internet connection"));
        }
        other => panic!("expected a network error, got {other:?}"),
    }
}

/// **VALUE**: Verifies the wall-clock budget beats a stalled attempt.
///
/// **WHY THIS MATTERS**: The overall budget is the user's last line of
/// defense against a backend that accepts connections but never answers
/// usefully; when it fires, the caller must get a timeout, never a partial
/// result.
///
/// **BUG THIS CATCHES**: Would catch the budget not racing the retry loop,
/// or the elapsed branch mapping to the wrong error kind.
#[tokio::test]
async fn given_slow_response_when_budget_elapses_then_timeout_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/explain"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(explanation_body())
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).with_request_budget(Duration::from_millis(50));
    let error = client
        .explain_selection(&ExplainRequest::new("print(1)", "python"))
        .await
        .expect_err("budget must elapse first");

    match error {
        ApiError::Timeout { ref message, .. } => {
            assert!(message.contains("timeout") || message.contains("Timeout"));
        }
        other => panic!("expected a timeout, got {other:?}"),
    }
}

/// **VALUE**: Verifies the explain-error operation serializes ranges as
/// plain data that round-trips exactly.
///
/// **WHY THIS MATTERS**: The backend consumes `errorRange` as four
/// integers; an opaque handle or a drifted shape would silently break
/// error explanations only, the hardest operation to debug.
///
/// **BUG THIS CATCHES**: Would catch the range type growing serialized
/// behavior or renamed fields.
#[tokio::test]
async fn given_error_range_when_explain_error_called_then_range_on_wire_is_plain_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/explain-error"))
        .and(body_partial_json(json!({
            "errorRange": {
                "start": {"line": 3, "character": 5},
                "end": {"line": 3, "character": 12}
            },
            "userLevel": "beginner"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(error_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let explanation = client
        .explain_error(&ErrorExplainRequest {
            code: "print(x)".to_string(),
            error_message: "name 'x' is not defined".to_string(),
            error_range: SourceRange::new(3, 5, 3, 12),
            diagnostic_code: None,
            language_id: "python".to_string(),
        })
        .await
        .expect("range body must have matched");

    assert_eq!(explanation.error_meaning, "m");
}

// ----------------------------------------------------------------------------
// Hot reconfiguration
// ----------------------------------------------------------------------------

/// **VALUE**: Verifies preference-only updates keep the live transport.
///
/// **WHY THIS MATTERS**: Rebuilding the HTTP client on every settings
/// change tears down healthy keep-alive connections for no reason; the
/// rebuild must happen exactly when the connection-affecting fields change.
///
/// **BUG THIS CATCHES**: Would catch an update path that rebuilds
/// unconditionally, or one that fails to rebuild on a credential change
/// (which would keep sending the old key).
#[tokio::test]
async fn given_config_updates_when_applied_then_transport_rebuilt_only_on_connection_change() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri());
    assert_eq!(client.transport_generation().await, 1);

    // Preference change only: same URL, same key
    let preferences_only = test_config(&server.uri()).with_user_level(UserLevel::Intermediate);
    client.update_config(&preferences_only).await.unwrap();
    assert_eq!(client.transport_generation().await, 1);

    // Credential change forces a rebuild
    let mut new_key = test_config(&server.uri());
    new_key.api_key = "rotated-key-9876543210".into();
    client.update_config(&new_key).await.unwrap();
    assert_eq!(client.transport_generation().await, 2);

    // Base URL change forces another
    let other_server = MockServer::start().await;
    let mut new_url = test_config(&other_server.uri());
    new_url.api_key = "rotated-key-9876543210".into();
    client.update_config(&new_url).await.unwrap();
    assert_eq!(client.transport_generation().await, 3);
}

/// **VALUE**: Verifies an updated user level reaches subsequent request
/// bodies without a transport rebuild.
///
/// **WHY THIS MATTERS**: The user level is merged into every body by the
/// binding; a stale snapshot would keep tailoring responses to the wrong
/// audience after the user changes their setting.
///
/// **BUG THIS CATCHES**: Would catch the in-place preference update not
/// propagating to the send path.
#[tokio::test]
async fn given_user_level_update_when_next_request_sent_then_new_level_in_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/explain"))
        .and(body_partial_json(json!({"userLevel": "intermediate"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(explanation_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let updated = test_config(&server.uri()).with_user_level(UserLevel::Intermediate);
    client.update_config(&updated).await.unwrap();

    client
        .explain_selection(&ExplainRequest::new("print(1)", "python"))
        .await
        .expect("body with intermediate userLevel must have matched");
}

/// **VALUE**: Verifies a rejected config leaves the old binding working.
///
/// **WHY THIS MATTERS**: A typo in the settings UI must not brick the
/// client; validation failures should be reported and the previous
/// transport kept.
///
/// **BUG THIS CATCHES**: Would catch update_config tearing down state
/// before validating its input.
#[tokio::test]
async fn given_invalid_config_when_update_attempted_then_old_binding_survives() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/explain"))
        .respond_with(ResponseTemplate::new(200).set_body_json(explanation_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());

    let mut broken = test_config(&server.uri());
    broken.api_base_url = "ftp://nope".to_string();
    assert!(client.update_config(&broken).await.is_err());
    assert_eq!(client.transport_generation().await, 1);

    client
        .explain_selection(&ExplainRequest::new("print(1)", "python"))
        .await
        .expect("old binding must still work");
}
