use serde::{Deserialize, Serialize};

/// Zero-based line/character position in a document.
///
/// Plain data: serializes to `{"line": n, "character": n}` and carries no
/// behavior beyond the two integers, so the wire form round-trips exactly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourcePosition {
    pub line: u32,
    pub character: u32,
}

/// Half-open source range between two positions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceRange {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl SourceRange {
    pub fn new(
        start_line: u32,
        start_character: u32,
        end_line: u32,
        end_character: u32,
    ) -> Self {
        Self {
            start: SourcePosition {
                line: start_line,
                character: start_character,
            },
            end: SourcePosition {
                line: end_line,
                character: end_character,
            },
        }
    }
}

/// Body for `/api/v1/explain`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainRequest {
    pub code: String,
    pub language_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surrounding_context: Option<String>,
}

impl ExplainRequest {
    pub fn new(code: impl Into<String>, language_id: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language_id: language_id.into(),
            file_path: None,
            surrounding_context: None,
        }
    }
}

/// Focus the backend applies when reviewing a selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReviewType {
    Quality,
    Style,
    Performance,
}

/// Body for `/api/v1/review`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub code: String,
    pub language_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub review_type: ReviewType,
}

/// Body for `/api/v1/explain-error`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorExplainRequest {
    pub code: String,
    pub error_message: String,
    pub error_range: SourceRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic_code: Option<String>,
    pub language_id: String,
}
