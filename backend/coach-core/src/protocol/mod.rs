//! Wire types for the backend's request/response operations.
//!
//! The backend speaks camelCase JSON; every type here carries the serde
//! renames to match. Requests are created fresh per call and not retained;
//! responses are validated before they are decoded into these types.

pub mod requests;
pub mod responses;

pub use requests::{
    ErrorExplainRequest, ExplainRequest, ReviewRequest, ReviewType, SourcePosition, SourceRange,
};
pub use responses::{ApiResponse, ErrorExplanation, Explanation, Improvement, LineExplanation, Review};

use std::fmt;

/// One of the three supported remote operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Explain,
    Review,
    ExplainError,
}

impl OperationKind {
    /// Endpoint path relative to the bound base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            OperationKind::Explain => crate::EXPLAIN_ENDPOINT,
            OperationKind::Review => crate::REVIEW_ENDPOINT,
            OperationKind::ExplainError => crate::EXPLAIN_ERROR_ENDPOINT,
        }
    }

    /// Discriminant tag a success response for this operation must carry.
    pub fn expected_tag(&self) -> &'static str {
        match self {
            OperationKind::Explain => "explain",
            OperationKind::Review => "review",
            OperationKind::ExplainError => "error",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Explain => "explain",
            OperationKind::Review => "review",
            OperationKind::ExplainError => "explain-error",
        };
        write!(f, "{name}")
    }
}
