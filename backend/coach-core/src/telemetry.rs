//! Construction of privacy-safe usage events.
//!
//! Events carry only scalars by construction - there is no way to attach
//! code content or other structured data to the metadata map. Delivery is
//! the executor's job ([`crate::api_client::ApiClient::log_event`]); this
//! module only builds the payloads.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use once_cell::sync::Lazy;
use serde::Serialize;
use uuid::Uuid;

/// One anonymous session id per process, shared by every event.
static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// The kinds of usage events the backend accepts.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TelemetryEventType {
    ExplainSelection,
    ReviewSelection,
    ExplainError,
    Feedback,
}

impl fmt::Display for TelemetryEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TelemetryEventType::ExplainSelection => "explainSelection",
            TelemetryEventType::ReviewSelection => "reviewSelection",
            TelemetryEventType::ExplainError => "explainError",
            TelemetryEventType::Feedback => "feedback",
        };
        write!(f, "{name}")
    }
}

/// Scalar metadata value. Keeping this closed is what makes the events
/// privacy-safe: nothing nested, nothing free-form beyond short strings.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    Count(u64),
    Flag(bool),
}

/// Body for `/api/v1/telemetry`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    #[serde(rename = "type")]
    pub event_type: TelemetryEventType,
    pub metadata: BTreeMap<String, MetadataValue>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub session_id: String,
    pub client_version: String,
}

impl TelemetryEvent {
    pub fn new(event_type: TelemetryEventType) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default();

        Self {
            event_type,
            metadata: BTreeMap::new(),
            timestamp,
            session_id: SESSION_ID.clone(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn with_text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .insert(key.into(), MetadataValue::Text(value.into()));
        self
    }

    pub fn with_count(mut self, key: impl Into<String>, value: u64) -> Self {
        self.metadata.insert(key.into(), MetadataValue::Count(value));
        self
    }

    pub fn with_flag(mut self, key: impl Into<String>, value: bool) -> Self {
        self.metadata.insert(key.into(), MetadataValue::Flag(value));
        self
    }
}
