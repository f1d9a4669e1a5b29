//! Retry policy with bounded exponential backoff.

use std::collections::HashSet;
use std::time::Duration;

use once_cell::sync::Lazy;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);

/// Statuses treated as transient unless a caller narrows the set.
pub static DEFAULT_RETRYABLE_STATUS_CODES: Lazy<HashSet<u16>> =
    Lazy::new(|| [408, 429, 500, 502, 503, 504].into_iter().collect());

/// Shift cap keeping `1 << attempt` inside u64 range.
const MAX_BACKOFF_SHIFT: u32 = 20;

/// Process-lifetime retry configuration for the request executor.
///
/// Immutable once built. Invariants are enforced by construction: at least
/// one attempt, and the delay cap never below the base delay.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    retryable_status_codes: HashSet<u16>,
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        retryable_status_codes: impl IntoIterator<Item = u16>,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: max_delay.max(base_delay),
            retryable_status_codes: retryable_status_codes.into_iter().collect(),
        }
    }

    /// Total attempts the executor may make, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Whether a response with this status may be retried.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_status_codes.contains(&status)
    }

    /// Delay before the attempt following `attempt` (zero-based):
    /// `min(base_delay * 2^attempt, max_delay)`.
    ///
    /// Deterministic and monotone non-decreasing in `attempt`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let shift = attempt.min(MAX_BACKOFF_SHIFT);
        let multiplier = 1_u64 << shift;
        let base_millis = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX);
        let max_millis = u64::try_from(self.max_delay.as_millis()).unwrap_or(u64::MAX);
        let bounded = base_millis.saturating_mul(multiplier).min(max_millis);
        Duration::from_millis(bounded)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTEMPTS,
            DEFAULT_BASE_DELAY,
            DEFAULT_MAX_DELAY,
            DEFAULT_RETRYABLE_STATUS_CODES.iter().copied(),
        )
    }
}
