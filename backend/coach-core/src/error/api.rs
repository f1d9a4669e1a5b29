use common::ErrorLocation;

use thiserror::Error as ThisError;

/// Terminal outcome of a remote operation, returned to callers once the
/// retry loop has given up (or decided never to start).
///
/// The `message` on every variant is safe to display verbatim to an end
/// user: it is built from the status/kind of the failure, never from
/// request state, so it can never contain the API key or any header value.
#[derive(Debug, ThisError)]
pub enum ApiError {
    #[error("Network Error: {message} {location}")]
    Network {
        message: String,
        location: ErrorLocation,
    },

    #[error("Timeout Error: {message} {location}")]
    Timeout {
        message: String,
        location: ErrorLocation,
    },

    #[error("Server Error (HTTP {status}): {message} {location}")]
    Server {
        status: u16,
        message: String,
        location: ErrorLocation,
    },

    #[error("Client Error (HTTP {status}): {message} {location}")]
    Client {
        status: u16,
        message: String,
        location: ErrorLocation,
    },

    #[error("Validation Error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },

    #[error("Unexpected Error: {message} {location}")]
    Unknown {
        message: String,
        location: ErrorLocation,
    },
}

impl ApiError {
    /// The user-facing message, without the source-location suffix.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Network { message, .. }
            | ApiError::Timeout { message, .. }
            | ApiError::Server { message, .. }
            | ApiError::Client { message, .. }
            | ApiError::Validation { message, .. }
            | ApiError::Unknown { message, .. } => message,
        }
    }

    /// The HTTP status this error was built from, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } | ApiError::Client { status, .. } => Some(*status),
            _ => None,
        }
    }
}
