//! Demo-mode substitute for the remote client.
//!
//! Produces locally generated responses that satisfy the same contracts
//! the response validator enforces on the real backend, so the rest of
//! the application cannot tell the two apart. The generation logic is
//! deliberately simple - this is a boundary stand-in, not a product
//! feature.

use crate::api_client::ApiClient;
use crate::config::{CoachConfig, UserLevel};
use crate::error::api::ApiError;
use crate::protocol::{
    ErrorExplainRequest, ErrorExplanation, ExplainRequest, Explanation, Improvement,
    LineExplanation, Review, ReviewRequest,
};
use crate::telemetry::TelemetryEvent;

use std::time::Duration;

use log::debug;
use tokio::sync::RwLock;
use tokio::time::sleep;

/// Simulated backend latency, so demo mode feels like the real thing.
const MOCK_LATENCY: Duration = Duration::from_millis(350);

pub struct MockCoachClient {
    user_level: RwLock<UserLevel>,
}

impl MockCoachClient {
    pub fn new(user_level: UserLevel) -> Self {
        Self {
            user_level: RwLock::new(user_level),
        }
    }

    /// Mirror of the real client's hot reconfiguration; only the user
    /// level matters here.
    pub async fn update_config(&self, config: &CoachConfig) {
        *self.user_level.write().await = config.user_level;
    }
}

impl Default for MockCoachClient {
    fn default() -> Self {
        Self::new(UserLevel::Beginner)
    }
}

impl ApiClient for MockCoachClient {
    async fn explain_selection(&self, request: &ExplainRequest) -> Result<Explanation, ApiError> {
        sleep(MOCK_LATENCY).await;
        let user_level = *self.user_level.read().await;

        let mut line_by_line: Vec<LineExplanation> = request
            .code
            .lines()
            .enumerate()
            .map(|(index, line)| LineExplanation {
                line_offset: index as u32,
                code: line.to_string(),
                explanation: line_explanation(line, user_level),
            })
            .collect();

        // The explanation contract requires at least one entry
        if line_by_line.is_empty() {
            line_by_line.push(LineExplanation {
                line_offset: 0,
                code: request.code.clone(),
                explanation: "This selection is empty; select some code to explain.".to_string(),
            });
        }

        Ok(Explanation {
            summary: match user_level {
                UserLevel::Beginner => format!(
                    "This {} snippet runs top to bottom, {} line(s) in total. Each line below is explained in order.",
                    request.language_id,
                    line_by_line.len()
                ),
                UserLevel::Intermediate => format!(
                    "{} snippet, {} line(s). Per-line breakdown below.",
                    request.language_id,
                    line_by_line.len()
                ),
            },
            line_by_line,
            pitfalls: Some(vec![
                "Demo mode is active, so this explanation is generated locally.".to_string(),
            ]),
            try_it_yourself: Some(
                "Change one value in the snippet and predict the output before running it."
                    .to_string(),
            ),
            related_concepts: Some(vec!["control flow".to_string(), "variables".to_string()]),
        })
    }

    async fn review_selection(&self, request: &ReviewRequest) -> Result<Review, ApiError> {
        sleep(MOCK_LATENCY).await;
        let user_level = *self.user_level.read().await;

        let line_count = request.code.lines().count().max(1);
        Ok(Review {
            summary: format!(
                "Reviewed {line_count} line(s) of {} for {:?} concerns (demo mode).",
                request.language_id, request.review_type
            ),
            good_points: vec!["The selection is short enough to review at a glance.".to_string()],
            improvement_points: vec![
                "Consider descriptive names for any single-letter variables.".to_string(),
            ],
            improvements: vec![Improvement {
                description: "Add a comment stating the intent of this block.".to_string(),
                improved_code: None,
                reasoning: match user_level {
                    UserLevel::Beginner => {
                        "Comments that say why the code exists make it much easier to revisit later."
                            .to_string()
                    }
                    UserLevel::Intermediate => {
                        "Intent comments cut re-reading cost for future maintainers.".to_string()
                    }
                },
            }],
            try_it_yourself: Some(
                "Rename one variable to something more descriptive and re-read the code."
                    .to_string(),
            ),
        })
    }

    async fn explain_error(
        &self,
        request: &ErrorExplainRequest,
    ) -> Result<ErrorExplanation, ApiError> {
        sleep(MOCK_LATENCY).await;
        let user_level = *self.user_level.read().await;

        Ok(ErrorExplanation {
            error_meaning: match user_level {
                UserLevel::Beginner => format!(
                    "The message \"{}\" means the {} tooling could not make sense of this part of your code.",
                    request.error_message, request.language_id
                ),
                UserLevel::Intermediate => format!(
                    "\"{}\" - a diagnostic raised while processing this range.",
                    request.error_message
                ),
            },
            why_here: format!(
                "It was reported at line {}, character {} of your selection.",
                request.error_range.start.line, request.error_range.start.character
            ),
            how_to_fix: "Re-read the flagged line for a typo or a missing symbol; demo mode cannot analyze further.".to_string(),
            related_concepts: Some(vec!["error messages".to_string(), "debugging".to_string()]),
            try_it_yourself: Some(
                "Reproduce the error on purpose in a scratch file, then fix it.".to_string(),
            ),
        })
    }

    async fn log_event(&self, event: TelemetryEvent) {
        debug!("[demo mode] telemetry event dropped: {}", event.event_type);
    }
}

fn line_explanation(line: &str, user_level: UserLevel) -> String {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return "A blank line, used to separate sections of code.".to_string();
    }
    if trimmed.starts_with('#') || trimmed.starts_with("//") {
        return "A comment; it documents the code and does not run.".to_string();
    }
    if trimmed.contains('=') && !trimmed.contains("==") {
        return match user_level {
            UserLevel::Beginner => {
                "Stores a value in a name so later lines can use it.".to_string()
            }
            UserLevel::Intermediate => "An assignment.".to_string(),
        };
    }
    match user_level {
        UserLevel::Beginner => "Performs one step of the program when it runs.".to_string(),
        UserLevel::Intermediate => "Executes as part of the surrounding flow.".to_string(),
    }
}
