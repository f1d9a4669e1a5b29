//! Transport binding: connection configuration and the raw send primitive.
//!
//! Owns the base URL, the credential, and the `reqwest::Client` carrying
//! the fixed default headers. The client is rebuilt only when the base URL
//! or credential changes; preference-only updates leave the existing
//! keep-alive connections untouched.

use crate::USER_AGENT;
use crate::config::{CoachConfig, UserLevel};
use crate::error::config::ConfigError;

use common::{ErrorLocation, RedactedApiKey};

use std::fmt;
use std::panic::Location;
use std::time::Duration;

use log::{debug, info};
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT as USER_AGENT_HEADER};
use serde_json::Value;
use url::Url;

/// Per-attempt timeout; the executor's overall budget is separate.
const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);
const BEARER_PREFIX: &str = "Bearer ";
const USER_LEVEL_FIELD: &str = "userLevel";
const BODY_SNIPPET_MAX_LEN: usize = 256;

/// Raw failure of one send attempt, before classification.
#[derive(Debug)]
pub enum SendFailure {
    /// No usable response arrived (DNS, connect, reset, per-attempt timeout).
    Transport(reqwest::Error),
    /// The backend answered with a non-2xx status.
    Status { status: u16, body: String },
    /// The backend answered 2xx but the body was not JSON.
    Decode { detail: String },
    /// The request could not be constructed at all.
    Request { detail: String },
}

impl fmt::Display for SendFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendFailure::Transport(error) => write!(f, "{error}"),
            SendFailure::Status { status, body } if body.is_empty() => {
                write!(f, "HTTP {status}")
            }
            SendFailure::Status { status, body } => write!(f, "HTTP {status} - {body}"),
            SendFailure::Decode { detail } => {
                write!(f, "response body was not valid JSON: {detail}")
            }
            SendFailure::Request { detail } => write!(f, "{detail}"),
        }
    }
}

/// The bound transport. Cheap to clone: executors snapshot it per attempt,
/// so a concurrent reconfiguration never tears state out from under an
/// in-flight request.
#[derive(Debug, Clone)]
pub struct Transport {
    base_url: Url,
    api_key: RedactedApiKey,
    user_level: UserLevel,
    telemetry_enabled: bool,
    client: Client,
    generation: u64,
}

impl Transport {
    /// Bind a transport to a validated config.
    pub fn new(config: &CoachConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let base_url = parse_base_url(&config.api_base_url)?;
        let client = build_client(&config.api_key)?;

        info!("Transport bound to {base_url} (generation 1)");

        Ok(Self {
            base_url,
            api_key: config.api_key.clone(),
            user_level: config.user_level,
            telemetry_enabled: config.telemetry_enabled,
            client,
            generation: 1,
        })
    }

    /// Apply a new config, rebuilding the underlying client only when the
    /// base URL or credential actually changed.
    pub fn update_config(&mut self, config: &CoachConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let new_base_url = parse_base_url(&config.api_base_url)?;
        let needs_rebuild = new_base_url != self.base_url || config.api_key != self.api_key;

        self.user_level = config.user_level;
        self.telemetry_enabled = config.telemetry_enabled;

        if needs_rebuild {
            self.client = build_client(&config.api_key)?;
            self.base_url = new_base_url;
            self.api_key = config.api_key.clone();
            self.generation += 1;
            info!(
                "Transport rebuilt for new endpoint or credential (generation {})",
                self.generation
            );
        } else {
            debug!(
                "Transport preferences updated in place (generation {})",
                self.generation
            );
        }

        Ok(())
    }

    /// Monotone counter bumped on every client rebuild.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn user_level(&self) -> UserLevel {
        self.user_level
    }

    pub fn telemetry_enabled(&self) -> bool {
        self.telemetry_enabled
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// POST a JSON body to an endpoint and decode the 2xx response body.
    ///
    /// The current `userLevel` is merged into any object body before
    /// serialization, regardless of which operation is calling.
    pub async fn send(&self, endpoint: &str, mut body: Value) -> Result<Value, SendFailure> {
        let url = self.base_url.join(endpoint).map_err(|e| SendFailure::Request {
            detail: format!("could not build request URL for endpoint '{endpoint}': {e}"),
        })?;

        if let Value::Object(ref mut fields) = body {
            fields.insert(
                USER_LEVEL_FIELD.to_string(),
                Value::String(self.user_level.as_str().to_string()),
            );
        }

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(SendFailure::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(SendFailure::Status {
                status: status.as_u16(),
                body: truncate_snippet(body_text),
            });
        }

        let body_text = response.text().await.map_err(SendFailure::Transport)?;
        if body_text.trim().is_empty() {
            // Bodyless 2xx (e.g. a 204 telemetry ack); validation decides
            // whether null is acceptable for the operation
            return Ok(Value::Null);
        }
        serde_json::from_str(&body_text).map_err(|e| SendFailure::Decode {
            detail: e.to_string(),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::Validation {
        reason: format!("Invalid API base URL '{raw}': {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}

fn build_client(api_key: &RedactedApiKey) -> Result<Client, ConfigError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT_HEADER, HeaderValue::from_static(USER_AGENT));

    let mut authorization =
        HeaderValue::from_str(&format!("{BEARER_PREFIX}{}", api_key.as_str())).map_err(|_| {
            // The header error is discarded: its Display could echo the value
            ConfigError::TransportBuild {
                message: "API key contains characters that cannot appear in an Authorization header"
                    .to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;
    authorization.set_sensitive(true);
    headers.insert(AUTHORIZATION, authorization);

    Client::builder()
        .timeout(ATTEMPT_TIMEOUT)
        .default_headers(headers)
        .build()
        .map_err(|e| ConfigError::TransportBuild {
            message: format!("Failed to build HTTP client: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}

fn truncate_snippet(body: String) -> String {
    if body.len() <= BODY_SNIPPET_MAX_LEN {
        return body;
    }
    let mut cut = BODY_SNIPPET_MAX_LEN;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &body[..cut])
}
