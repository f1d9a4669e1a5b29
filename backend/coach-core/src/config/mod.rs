//! Client configuration sourced from the host application's settings.
//!
//! The host application materializes a [`CoachConfig`] from its persisted
//! user preferences and hands it to the remote-call layer; the layer never
//! reads settings storage itself. The config is validated before the
//! transport binds to it, and replaced wholesale on every settings change.

use crate::error::config::ConfigError;

use common::{ErrorLocation, RedactedApiKey};

use std::panic::Location;

use log::warn;
use serde::{Deserialize, Serialize};
use url::Url;

const MIN_API_KEY_LENGTH: usize = 10;

/// Experience level the backend tailors its explanations to.
///
/// Serialized as the `userLevel` field merged into every request body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum UserLevel {
    Beginner,
    Intermediate,
}

impl Default for UserLevel {
    fn default() -> Self {
        UserLevel::Beginner
    }
}

impl UserLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserLevel::Beginner => "beginner",
            UserLevel::Intermediate => "intermediate",
        }
    }
}

/// Connection and preference state for the remote-call layer.
///
/// Owned by the transport binding once applied. Replaced atomically on
/// update, never mutated field-by-field, so concurrent readers always see
/// a complete snapshot.
#[derive(Debug, Clone)]
pub struct CoachConfig {
    /// Base URL of the backend service, e.g. `https://api.flowpilot.dev`.
    pub api_base_url: String,
    /// Bearer credential for the backend. Never logged, never serialized.
    pub api_key: RedactedApiKey,
    pub user_level: UserLevel,
    pub telemetry_enabled: bool,
    /// When set, the host application substitutes the mock client and the
    /// API key requirement is waived.
    pub demo_mode: bool,
}

impl CoachConfig {
    pub fn new(api_base_url: impl Into<String>, api_key: impl Into<RedactedApiKey>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            api_key: api_key.into(),
            user_level: UserLevel::default(),
            telemetry_enabled: true,
            demo_mode: false,
        }
    }

    pub fn with_user_level(mut self, user_level: UserLevel) -> Self {
        self.user_level = user_level;
        self
    }

    pub fn with_telemetry_enabled(mut self, enabled: bool) -> Self {
        self.telemetry_enabled = enabled;
        self
    }

    pub fn with_demo_mode(mut self, demo_mode: bool) -> Self {
        self.demo_mode = demo_mode;
        self
    }

    /// Validate config values before binding a transport to them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the base URL does not parse
    /// as an http(s) URL, or if the API key is missing/malformed while not
    /// in demo mode. The reason string never contains the key itself.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.is_empty() {
            return Err(ConfigError::Validation {
                reason: "API base URL is required".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let url = Url::parse(&self.api_base_url).map_err(|e| ConfigError::Validation {
            reason: format!("Invalid API base URL '{}': {e}", self.api_base_url),
            location: ErrorLocation::from(Location::caller()),
        })?;

        match url.scheme() {
            "https" => {}
            "http" => {
                let host = url.host_str().unwrap_or_default();
                if host != "localhost" && host != "127.0.0.1" {
                    warn!(
                        "Using plain HTTP for non-local API endpoint {host}, consider HTTPS"
                    );
                }
            }
            other => {
                return Err(ConfigError::Validation {
                    reason: format!(
                        "Invalid API URL scheme '{other}': only http and https are supported"
                    ),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        // Demo mode runs against the mock client, so no credential is needed
        if !self.demo_mode {
            if self.api_key.is_empty() {
                return Err(ConfigError::Validation {
                    reason: "API key is required (or enable demo mode to run without one)"
                        .to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            if self.api_key.len() < MIN_API_KEY_LENGTH {
                return Err(ConfigError::Validation {
                    reason: format!(
                        "API key appears to be too short ({} characters, expected at least {MIN_API_KEY_LENGTH})",
                        self.api_key.len()
                    ),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            if self.api_key.contains_whitespace() {
                return Err(ConfigError::Validation {
                    reason: "API key must not contain whitespace".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        Ok(())
    }
}
