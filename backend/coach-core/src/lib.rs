//! Remote-call layer for the FlowPilot client.
//!
//! Everything needed to invoke the backend's explain/review/explain-error
//! operations over HTTP: a transport binding that owns connection
//! configuration, a retrying request executor, an error classifier
//! separating transient from terminal failures, and a response validator
//! that turns untyped backend JSON into a closed set of typed results.

pub mod api_client;
pub mod config;
pub mod error;
pub mod mock;
pub mod protocol;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub const CLIENT_NAME: &str = "FlowPilot-Desktop";
pub const USER_AGENT: &str = const_format::concatcp!(CLIENT_NAME, "/", env!("CARGO_PKG_VERSION"));

pub const API_VERSION_PATH: &str = "api/v1/";
pub const EXPLAIN_ENDPOINT: &str = const_format::concatcp!(API_VERSION_PATH, "explain");
pub const REVIEW_ENDPOINT: &str = const_format::concatcp!(API_VERSION_PATH, "review");
pub const EXPLAIN_ERROR_ENDPOINT: &str = const_format::concatcp!(API_VERSION_PATH, "explain-error");
pub const TELEMETRY_ENDPOINT: &str = const_format::concatcp!(API_VERSION_PATH, "telemetry");

pub use api_client::retry::RetryPolicy;
pub use api_client::{ApiClient, CoachApiClient};
pub use config::{CoachConfig, UserLevel};
pub use error::CoreError;
pub use error::api::ApiError;
pub use mock::MockCoachClient;
