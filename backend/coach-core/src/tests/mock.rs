// Unit tests for the demo-mode substitute.
// The one property that matters: its output must pass the same contract
// validation the real backend's responses are held to.

use crate::api_client::ApiClient;
use crate::api_client::validate::validate_response;
use crate::config::{CoachConfig, UserLevel};
use crate::mock::MockCoachClient;
use crate::protocol::{
    ErrorExplainRequest, ExplainRequest, OperationKind, ReviewRequest, ReviewType, SourceRange,
};

#[tokio::test]
async fn given_explain_request_when_mocked_then_response_satisfies_contract() {
    let client = MockCoachClient::default();
    let request = ExplainRequest::new("x = 1\nprint(x)", "python");

    let explanation = client.explain_selection(&request).await.unwrap();

    assert_eq!(explanation.line_by_line.len(), 2);
    assert_eq!(explanation.line_by_line[0].code, "x = 1");
    assert_eq!(explanation.line_by_line[1].line_offset, 1);

    // Round the typed response through the validator used on real payloads
    let payload =
        serde_json::to_value(crate::protocol::ApiResponse::Explain(explanation)).unwrap();
    assert!(validate_response(OperationKind::Explain, &payload).is_ok());
}

#[tokio::test]
async fn given_empty_selection_when_mocked_then_line_list_still_non_empty() {
    let client = MockCoachClient::default();
    let request = ExplainRequest::new("", "python");

    let explanation = client.explain_selection(&request).await.unwrap();

    assert!(!explanation.line_by_line.is_empty());
}

#[tokio::test]
async fn given_review_request_when_mocked_then_response_satisfies_contract() {
    let client = MockCoachClient::default();
    let request = ReviewRequest {
        code: "def f():\n    return 1".to_string(),
        language_id: "python".to_string(),
        file_path: None,
        review_type: ReviewType::Quality,
    };

    let review = client.review_selection(&request).await.unwrap();

    let payload = serde_json::to_value(crate::protocol::ApiResponse::Review(review)).unwrap();
    assert!(validate_response(OperationKind::Review, &payload).is_ok());
}

#[tokio::test]
async fn given_error_request_when_mocked_then_response_satisfies_contract() {
    let client = MockCoachClient::default();
    let request = ErrorExplainRequest {
        code: "print(x)".to_string(),
        error_message: "name 'x' is not defined".to_string(),
        error_range: SourceRange::new(0, 6, 0, 7),
        diagnostic_code: None,
        language_id: "python".to_string(),
    };

    let explanation = client.explain_error(&request).await.unwrap();

    assert!(explanation.error_meaning.contains("name 'x' is not defined"));
    let payload = serde_json::to_value(crate::protocol::ApiResponse::Error(explanation)).unwrap();
    assert!(validate_response(OperationKind::ExplainError, &payload).is_ok());
}

#[tokio::test]
async fn given_config_update_when_applied_then_user_level_changes_tone() {
    let client = MockCoachClient::new(UserLevel::Beginner);
    let request = ExplainRequest::new("x = 1", "python");

    let beginner = client.explain_selection(&request).await.unwrap();

    let config = CoachConfig::new("https://api.flowpilot.dev", "sk-0123456789")
        .with_user_level(UserLevel::Intermediate)
        .with_demo_mode(true);
    client.update_config(&config).await;

    let intermediate = client.explain_selection(&request).await.unwrap();

    assert_ne!(beginner.summary, intermediate.summary);
}
