use serde::{Deserialize, Serialize};

/// Explanation of a single line within the selected code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineExplanation {
    /// Zero-based offset from the first line of the selection.
    pub line_offset: u32,
    /// The original line text.
    pub code: String,
    pub explanation: String,
}

/// Success payload of `/api/v1/explain`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    pub summary: String,
    /// Ordered, never empty for a contract-conforming response.
    pub line_by_line: Vec<LineExplanation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitfalls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub try_it_yourself: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_concepts: Option<Vec<String>>,
}

/// A single suggested improvement within a review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Improvement {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improved_code: Option<String>,
    pub reasoning: String,
}

/// Success payload of `/api/v1/review`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub summary: String,
    pub good_points: Vec<String>,
    pub improvement_points: Vec<String>,
    pub improvements: Vec<Improvement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub try_it_yourself: Option<String>,
}

/// Success payload of `/api/v1/explain-error`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorExplanation {
    pub error_meaning: String,
    pub why_here: String,
    pub how_to_fix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_concepts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub try_it_yourself: Option<String>,
}

/// Closed union over every success response the backend can produce,
/// discriminated by the `type` field.
///
/// Downstream code pattern-matches on these variants instead of trusting
/// untyped JSON; the response validator guarantees the variant matches the
/// operation that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ApiResponse {
    #[serde(rename = "explain")]
    Explain(Explanation),
    #[serde(rename = "review")]
    Review(Review),
    #[serde(rename = "error")]
    Error(ErrorExplanation),
}

impl ApiResponse {
    /// The discriminant tag this variant serializes with.
    pub fn tag(&self) -> &'static str {
        match self {
            ApiResponse::Explain(_) => "explain",
            ApiResponse::Review(_) => "review",
            ApiResponse::Error(_) => "error",
        }
    }
}
