use crate::ErrorLocation;

use thiserror::Error as ThisError;

/// Raised when something attempts to serialize a redacted credential.
#[derive(Debug, ThisError)]
pub enum RedactError {
    #[error("Serialization Error: {message} {location}")]
    Serialization {
        message: String,
        location: ErrorLocation,
    },
}
