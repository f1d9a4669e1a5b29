use crate::helpers::{explanation_body, fast_policy, test_client, test_config};

use coach_core::protocol::ExplainRequest;
use coach_core::telemetry::{TelemetryEvent, TelemetryEventType};
use coach_core::{ApiClient, CoachApiClient};

use std::time::Duration;

use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Give the detached delivery task a chance to run before the mock server
/// verifies its expectations on drop.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(150)).await;
}

/// **VALUE**: Verifies telemetry failures are invisible to primary callers.
///
/// **WHY THIS MATTERS**: Telemetry shares the transport with the real
/// operations; the whole point of the sideband design is that its
/// failures never block or fail an explain call issued at the same time.
///
/// **BUG THIS CATCHES**: Would catch telemetry delivery being joined into
/// the primary path, or its errors propagating instead of being swallowed.
#[tokio::test]
async fn given_failing_telemetry_endpoint_when_logging_then_concurrent_explain_unaffected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/telemetry"))
        .respond_with(ResponseTemplate::new(500))
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

    let event = TelemetryEvent::new(TelemetryEventType::ExplainSelection)
        .with_text("languageId", "python");
    let explain_request = ExplainRequest::new("print(1)", "python");
    let (_, explanation) = tokio::join!(
        client.log_event(event),
        client.explain_selection(&explain_request)
    );

    explanation.expect("telemetry failure must not leak into explain");
    settle().await;
}

/// **VALUE**: Verifies a delivered event carries the documented shape.
///
/// **WHY THIS MATTERS**: The telemetry endpoint has no validated response,
/// so the request body is the only contract; session id and user level
/// enrichment happen on the client side and must actually reach the wire.
///
/// **BUG THIS CATCHES**: Would catch the userLevel body merge skipping the
/// telemetry path, or event serialization drifting from camelCase.
#[tokio::test]
async fn given_telemetry_enabled_when_event_logged_then_body_reaches_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/telemetry"))
        .and(body_partial_json(serde_json::json!({
            "type": "reviewSelection",
            "userLevel": "beginner"
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client
        .log_event(TelemetryEvent::new(TelemetryEventType::ReviewSelection))
        .await;

    settle().await;
}

/// **VALUE**: Verifies the telemetry opt-out is honored before any I/O.
///
/// **WHY THIS MATTERS**: Sending events a user disabled is a privacy
/// violation, not a bug with a workaround.
///
/// **BUG THIS CATCHES**: Would catch the enabled check being dropped or
/// moved after the send.
#[tokio::test]
async fn given_telemetry_disabled_when_event_logged_then_no_request_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/telemetry"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config(&server.uri()).with_telemetry_enabled(false);
    let client = CoachApiClient::with_policy(&config, fast_policy()).unwrap();

    client
        .log_event(TelemetryEvent::new(TelemetryEventType::Feedback))
        .await;

    settle().await;
}
