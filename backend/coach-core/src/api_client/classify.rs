//! Error classification: transient versus terminal, by rule priority.

use crate::api_client::retry::RetryPolicy;
use crate::api_client::transport::SendFailure;

use common::HttpStatusCode;

use std::fmt;

/// Stable tag describing what went wrong with an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Timeout,
    Server(u16),
    Client(u16),
    Validation,
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Network => write!(f, "network failure"),
            ErrorKind::Timeout => write!(f, "timeout"),
            ErrorKind::Server(status) => write!(f, "server error (HTTP {status})"),
            ErrorKind::Client(status) => write!(f, "client error (HTTP {status})"),
            ErrorKind::Validation => write!(f, "response validation failure"),
            ErrorKind::Unknown => write!(f, "unexpected failure"),
        }
    }
}

/// Outcome of classifying one raw attempt failure.
#[derive(Debug, Clone)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub retryable: bool,
    /// Diagnostic detail for logs and fallback messages. Never contains
    /// the credential: it is built from transport error text and response
    /// bodies only.
    pub detail: String,
}

/// Map a raw send failure to a retry decision.
///
/// Rule order is load-bearing:
/// 1. No response at all (connect, DNS, reset, per-attempt timeout) is
///    always transient - a slow backend must never look like a client bug.
/// 2. A status in the policy's retryable set is a transient server-side
///    failure, whatever its numeric range.
/// 3. Any other 4xx/5xx is a deterministic rejection; retrying it would
///    hammer a backend that has already made up its mind.
/// 4. Everything else is unknown and terminal.
pub fn classify(failure: &SendFailure, policy: &RetryPolicy) -> ClassifiedError {
    match failure {
        SendFailure::Transport(error) => {
            if error.is_timeout() {
                ClassifiedError {
                    kind: ErrorKind::Timeout,
                    retryable: true,
                    detail: "the request timed out before a response arrived".to_string(),
                }
            } else {
                ClassifiedError {
                    kind: ErrorKind::Network,
                    retryable: true,
                    detail: error.to_string(),
                }
            }
        }
        SendFailure::Status { status, body } => {
            if policy.is_retryable_status(*status) {
                let detail = if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    format!("HTTP {status} - {body}")
                };
                ClassifiedError {
                    kind: ErrorKind::Server(*status),
                    retryable: true,
                    detail,
                }
            } else {
                let code = HttpStatusCode(*status);
                if code.is_client_error() || code.is_server_error() {
                    ClassifiedError {
                        kind: ErrorKind::Client(*status),
                        retryable: false,
                        detail: body.clone(),
                    }
                } else {
                    ClassifiedError {
                        kind: ErrorKind::Unknown,
                        retryable: false,
                        detail: format!("unexpected HTTP status {status}"),
                    }
                }
            }
        }
        SendFailure::Decode { detail } => ClassifiedError {
            kind: ErrorKind::Validation,
            retryable: false,
            detail: format!(
                "Invalid response format: the server returned a success status with a body that was not valid JSON ({detail})."
            ),
        },
        SendFailure::Request { detail } => ClassifiedError {
            kind: ErrorKind::Unknown,
            retryable: false,
            detail: detail.clone(),
        },
    }
}
