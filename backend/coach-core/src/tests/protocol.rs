// Unit tests for the wire types: camelCase renames, optional-field
// elision, the tagged response union, and the plain-data range contract.

use crate::protocol::{
    ApiResponse, ErrorExplainRequest, ExplainRequest, ReviewRequest, ReviewType, SourcePosition,
    SourceRange,
};

use serde_json::json;

#[test]
fn given_source_range_when_serialized_then_plain_nested_objects() {
    let range = SourceRange::new(3, 5, 3, 12);

    let serialized = serde_json::to_value(range).unwrap();

    assert_eq!(
        serialized,
        json!({
            "start": {"line": 3, "character": 5},
            "end": {"line": 3, "character": 12}
        })
    );
}

#[test]
fn given_source_range_when_round_tripped_then_integers_identical() {
    let range = SourceRange::new(3, 5, 3, 12);

    let serialized = serde_json::to_string(&range).unwrap();
    let decoded: SourceRange = serde_json::from_str(&serialized).unwrap();

    assert_eq!(decoded, range);
    assert_eq!(decoded.start, SourcePosition { line: 3, character: 5 });
    assert_eq!(decoded.end, SourcePosition { line: 3, character: 12 });
}

#[test]
fn given_explain_request_when_serialized_then_camel_case_and_no_empty_optionals() {
    let request = ExplainRequest::new("print(1)", "python");

    let serialized = serde_json::to_value(&request).unwrap();

    assert_eq!(serialized["code"], "print(1)");
    assert_eq!(serialized["languageId"], "python");
    let fields = serialized.as_object().unwrap();
    assert!(!fields.contains_key("filePath"));
    assert!(!fields.contains_key("surroundingContext"));
}

#[test]
fn given_review_request_when_serialized_then_review_type_lowercase() {
    let request = ReviewRequest {
        code: "x = 1".to_string(),
        language_id: "python".to_string(),
        file_path: Some("main.py".to_string()),
        review_type: ReviewType::Performance,
    };

    let serialized = serde_json::to_value(&request).unwrap();

    assert_eq!(serialized["reviewType"], "performance");
    assert_eq!(serialized["filePath"], "main.py");
}

#[test]
fn given_error_request_when_serialized_then_range_embedded_as_data() {
    let request = ErrorExplainRequest {
        code: "print(x)".to_string(),
        error_message: "name 'x' is not defined".to_string(),
        error_range: SourceRange::new(0, 6, 0, 7),
        diagnostic_code: None,
        language_id: "python".to_string(),
    };

    let serialized = serde_json::to_value(&request).unwrap();

    assert_eq!(serialized["errorMessage"], "name 'x' is not defined");
    assert_eq!(
        serialized["errorRange"],
        json!({
            "start": {"line": 0, "character": 6},
            "end": {"line": 0, "character": 7}
        })
    );
    assert!(!serialized.as_object().unwrap().contains_key("diagnosticCode"));
}

#[test]
fn given_tagged_payloads_when_decoded_then_union_variant_matches_tag() {
    let explain: ApiResponse = serde_json::from_value(json!({
        "type": "explain",
        "summary": "s",
        "lineByLine": [{"lineOffset": 0, "code": "c", "explanation": "e"}]
    }))
    .unwrap();
    assert_eq!(explain.tag(), "explain");

    let review: ApiResponse = serde_json::from_value(json!({
        "type": "review",
        "summary": "s",
        "goodPoints": [],
        "improvementPoints": [],
        "improvements": []
    }))
    .unwrap();
    assert_eq!(review.tag(), "review");

    let error: ApiResponse = serde_json::from_value(json!({
        "type": "error",
        "errorMeaning": "m",
        "whyHere": "w",
        "howToFix": "f"
    }))
    .unwrap();
    assert_eq!(error.tag(), "error");
}

#[test]
fn given_unknown_tag_when_decoded_then_rejected() {
    let result: Result<ApiResponse, _> = serde_json::from_value(json!({
        "type": "summarize",
        "summary": "s"
    }));

    assert!(result.is_err());
}
