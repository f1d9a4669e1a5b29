//! Request executor for the three remote operations.
//!
//! Orchestrates one logical operation end to end: snapshot the transport
//! binding, send, classify failures, back off and retry transient ones,
//! validate the successful payload, and hand the caller either a typed
//! response or a single terminal [`ApiError`] - never a raw transport
//! exception.

pub mod classify;
pub mod retry;
pub mod transport;
pub mod validate;

use crate::TELEMETRY_ENDPOINT;
use crate::config::CoachConfig;
use crate::error::api::ApiError;
use crate::error::config::ConfigError;
use crate::protocol::{
    ApiResponse, ErrorExplainRequest, ErrorExplanation, ExplainRequest, Explanation,
    OperationKind, Review, ReviewRequest,
};
use crate::telemetry::TelemetryEvent;

use classify::{ClassifiedError, ErrorKind, classify};
use retry::RetryPolicy;
use transport::Transport;

use common::ErrorLocation;

use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

use humantime::format_duration;
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::time::{sleep, timeout};

/// Default wall-clock budget for one whole attempt sequence.
const DEFAULT_REQUEST_BUDGET: Duration = Duration::from_secs(120);

/// The operations the backend offers. Implemented by the real HTTP client
/// and by the demo-mode substitute; callers depend on this seam, not on a
/// concrete client.
#[allow(async_fn_in_trait)]
pub trait ApiClient {
    async fn explain_selection(&self, request: &ExplainRequest) -> Result<Explanation, ApiError>;

    async fn review_selection(&self, request: &ReviewRequest) -> Result<Review, ApiError>;

    async fn explain_error(
        &self,
        request: &ErrorExplainRequest,
    ) -> Result<ErrorExplanation, ApiError>;

    /// Fire-and-forget usage event. Never fails, never blocks the caller
    /// on delivery.
    async fn log_event(&self, event: TelemetryEvent);
}

/// HTTP client for the FlowPilot backend with retry, validation, and
/// hot reconfiguration.
#[derive(Clone)]
pub struct CoachApiClient {
    transport: Arc<RwLock<Transport>>,
    policy: RetryPolicy,
    request_budget: Duration,
}

impl CoachApiClient {
    /// Build a client from a validated config with the default retry policy.
    pub fn new(config: &CoachConfig) -> Result<Self, ConfigError> {
        Self::with_policy(config, RetryPolicy::default())
    }

    pub fn with_policy(config: &CoachConfig, policy: RetryPolicy) -> Result<Self, ConfigError> {
        Ok(Self {
            transport: Arc::new(RwLock::new(Transport::new(config)?)),
            policy,
            request_budget: DEFAULT_REQUEST_BUDGET,
        })
    }

    /// Override the wall-clock budget one attempt sequence may consume.
    pub fn with_request_budget(mut self, budget: Duration) -> Self {
        self.request_budget = budget;
        self
    }

    /// Apply a new config. The underlying HTTP client is rebuilt only when
    /// the base URL or credential changed; in-flight operations keep the
    /// snapshot they started with.
    pub async fn update_config(&self, config: &CoachConfig) -> Result<(), ConfigError> {
        self.transport.write().await.update_config(config)
    }

    /// Rebuild counter of the bound transport (bumps only on rebuild).
    pub async fn transport_generation(&self) -> u64 {
        self.transport.read().await.generation()
    }

    async fn execute(&self, kind: OperationKind, body: Value) -> Result<ApiResponse, ApiError> {
        match timeout(self.request_budget, self.execute_attempts(kind, body)).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => Err(ApiError::Timeout {
                message: format!(
                    "Request timeout: The {kind} operation did not complete within {}. Please check your internet connection and try again.",
                    format_duration(self.request_budget)
                ),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// The retry loop. Attempts are strictly sequential; the only
    /// suspension points are the send itself and the backoff sleep.
    async fn execute_attempts(
        &self,
        kind: OperationKind,
        body: Value,
    ) -> Result<ApiResponse, ApiError> {
        let max_attempts = self.policy.max_attempts();
        let mut last_failure: Option<ClassifiedError> = None;

        for attempt in 0..max_attempts {
            let transport = self.transport.read().await.clone();

            match transport.send(kind.endpoint(), body.clone()).await {
                Ok(payload) => return validate::validate_response(kind, &payload),
                Err(failure) => {
                    let classified = classify(&failure, &self.policy);
                    if !classified.retryable {
                        return Err(terminal_error(kind, &classified, attempt + 1));
                    }
                    if attempt + 1 < max_attempts {
                        let delay = self.policy.delay_for_attempt(attempt);
                        warn!(
                            "{kind} request failed (attempt {}/{max_attempts}), retrying in {}: {}",
                            attempt + 1,
                            format_duration(delay),
                            classified.detail
                        );
                        sleep(delay).await;
                    }
                    last_failure = Some(classified);
                }
            }
        }

        match last_failure {
            Some(classified) => Err(terminal_error(kind, &classified, max_attempts)),
            // Unreachable with max_attempts >= 1, handled without panicking
            None => Err(ApiError::Unknown {
                message: format!(
                    "Unexpected error during {kind}: the retry loop produced no outcome. Please try again."
                ),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    fn encode_request<T: Serialize>(
        &self,
        kind: OperationKind,
        request: &T,
    ) -> Result<Value, ApiError> {
        serde_json::to_value(request).map_err(|e| ApiError::Unknown {
            message: format!(
                "Unexpected error during {kind}: the request could not be encoded ({e}). Please try again."
            ),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

impl ApiClient for CoachApiClient {
    async fn explain_selection(&self, request: &ExplainRequest) -> Result<Explanation, ApiError> {
        let kind = OperationKind::Explain;
        let body = self.encode_request(kind, request)?;
        match self.execute(kind, body).await? {
            ApiResponse::Explain(explanation) => Ok(explanation),
            other => Err(tag_mismatch(kind, other.tag())),
        }
    }

    async fn review_selection(&self, request: &ReviewRequest) -> Result<Review, ApiError> {
        let kind = OperationKind::Review;
        let body = self.encode_request(kind, request)?;
        match self.execute(kind, body).await? {
            ApiResponse::Review(review) => Ok(review),
            other => Err(tag_mismatch(kind, other.tag())),
        }
    }

    async fn explain_error(
        &self,
        request: &ErrorExplainRequest,
    ) -> Result<ErrorExplanation, ApiError> {
        let kind = OperationKind::ExplainError;
        let body = self.encode_request(kind, request)?;
        match self.execute(kind, body).await? {
            ApiResponse::Error(explanation) => Ok(explanation),
            other => Err(tag_mismatch(kind, other.tag())),
        }
    }

    async fn log_event(&self, event: TelemetryEvent) {
        let transport = self.transport.read().await.clone();

        if !transport.telemetry_enabled() {
            debug!("Telemetry disabled, dropping '{}' event", event.event_type);
            return;
        }

        let payload = match serde_json::to_value(&event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to encode telemetry event, dropping it: {e}");
                return;
            }
        };

        // Detached on purpose: telemetry failures must never reach, or
        // delay, a caller of the primary operations.
        tokio::spawn(async move {
            if let Err(failure) = transport.send(TELEMETRY_ENDPOINT, payload).await {
                warn!("Telemetry delivery failed, event discarded: {failure}");
            }
        });
    }
}

/// Build the caller-facing terminal error for an exhausted or
/// non-retryable classification. Messages are self-contained, actionable,
/// and never derived from request state, so they cannot leak credentials.
fn terminal_error(
    operation: OperationKind,
    classified: &ClassifiedError,
    attempts: u32,
) -> ApiError {
    let location = ErrorLocation::from(Location::caller());
    let attempts_suffix = if attempts > 1 {
        format!(" (gave up after {attempts} attempts)")
    } else {
        String::new()
    };

    match classified.kind {
        ErrorKind::Network => ApiError::Network {
            message: format!(
                "Network error: Unable to connect to the FlowPilot service. Please check your internet connection and API endpoint configuration, then try again.{attempts_suffix}"
            ),
            location,
        },
        ErrorKind::Timeout => ApiError::Timeout {
            message: format!(
                "Request timeout: The {operation} operation took too long to complete. Please check your internet connection and try again.{attempts_suffix}"
            ),
            location,
        },
        ErrorKind::Server(status) => ApiError::Server {
            status,
            message: format!("{}{attempts_suffix}", server_message(status)),
            location,
        },
        ErrorKind::Client(status) => ApiError::Client {
            status,
            message: client_message(status, &classified.detail),
            location,
        },
        ErrorKind::Validation => ApiError::Validation {
            message: classified.detail.clone(),
            location,
        },
        ErrorKind::Unknown => ApiError::Unknown {
            message: format!(
                "Unexpected error during {operation}: {}. Please try again.",
                classified.detail
            ),
            location,
        },
    }
}

fn server_message(status: u16) -> String {
    match status {
        408 => "Request timeout: The FlowPilot service took too long to respond. Please try again in a moment.".to_string(),
        429 => "Rate limit exceeded: You are making requests too quickly. Please wait a moment before trying again.".to_string(),
        500 => "Server error: The FlowPilot service is experiencing issues. Please try again in a few minutes.".to_string(),
        502 | 503 | 504 => "Service unavailable: The FlowPilot service is temporarily unavailable. Please try again later.".to_string(),
        other => format!(
            "Server error: The FlowPilot service failed to handle the request (HTTP {other}). Please try again later."
        ),
    }
}

fn client_message(status: u16, body: &str) -> String {
    match status {
        400 => {
            let detail =
                extract_server_message(body).unwrap_or_else(|| "Invalid request format".to_string());
            format!("Bad request: {detail}. Please check your code selection and try again.")
        }
        401 => "Authentication failed: Please check your FlowPilot API key in the extension settings.".to_string(),
        403 => "Access denied: Your API key may not have permission for this operation, or you may have exceeded your usage quota.".to_string(),
        404 => "Service not found: The FlowPilot API endpoint may be incorrect. Please check your settings.".to_string(),
        413 => "Request too large: The selected code is too large to process. Please select a smaller snippet.".to_string(),
        other => {
            let detail =
                extract_server_message(body).unwrap_or_else(|| "the request was rejected".to_string());
            format!(
                "API error (HTTP {other}): {detail}. If this problem persists, please check the FlowPilot service status."
            )
        }
    }
}

/// Pull a human-readable message out of a JSON error body, if the backend
/// sent one (`{"message": ...}` or `{"error": ...}`).
fn extract_server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let fields = value.as_object()?;
    fields
        .get("message")
        .or_else(|| fields.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[track_caller]
fn tag_mismatch(kind: OperationKind, actual_tag: &str) -> ApiError {
    ApiError::Validation {
        message: format!(
            "Invalid response type: expected a '{}' response, but received '{actual_tag}'. This may indicate a server configuration issue.",
            kind.expected_tag()
        ),
        location: ErrorLocation::from(Location::caller()),
    }
}
