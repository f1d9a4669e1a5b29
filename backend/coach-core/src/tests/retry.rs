// Unit tests for the backoff scheduler.
// The properties under test come straight from the executor's needs:
// deterministic delays, exponential growth, a hard cap, monotonicity.

use crate::api_client::retry::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRYABLE_STATUS_CODES, RetryPolicy,
};

use std::time::Duration;

fn policy(base_ms: u64, max_ms: u64) -> RetryPolicy {
    RetryPolicy::new(
        4,
        Duration::from_millis(base_ms),
        Duration::from_millis(max_ms),
        DEFAULT_RETRYABLE_STATUS_CODES.iter().copied(),
    )
}

#[test]
fn given_first_attempt_when_delay_computed_then_equals_base_delay() {
    assert_eq!(
        policy(250, 8_000).delay_for_attempt(0),
        Duration::from_millis(250)
    );
}

#[test]
fn given_later_attempts_when_delay_computed_then_doubles_each_time() {
    let policy = policy(100, 10_000);
    assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
    assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(400));
    assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(800));
}

#[test]
fn given_large_attempt_index_when_delay_computed_then_capped_at_max() {
    let policy = policy(1_000, 4_000);
    assert_eq!(policy.delay_for_attempt(5), Duration::from_millis(4_000));
    assert_eq!(policy.delay_for_attempt(63), Duration::from_millis(4_000));
}

#[test]
fn given_any_attempt_sequence_when_delays_computed_then_monotone_and_bounded() {
    let policy = policy(50, 2_000);
    let mut previous = Duration::ZERO;
    for attempt in 0..32 {
        let delay = policy.delay_for_attempt(attempt);
        assert!(delay >= previous, "delay must never shrink");
        assert!(delay <= policy.max_delay(), "delay must never exceed cap");
        previous = delay;
    }
}

#[test]
fn given_zero_attempts_when_policy_built_then_clamped_to_one() {
    let policy = RetryPolicy::new(0, Duration::from_secs(1), Duration::from_secs(2), []);
    assert_eq!(policy.max_attempts(), 1);
}

#[test]
fn given_cap_below_base_when_policy_built_then_cap_raised_to_base() {
    let policy = RetryPolicy::new(3, Duration::from_secs(5), Duration::from_secs(1), []);
    assert!(policy.max_delay() >= policy.base_delay());
    assert_eq!(policy.delay_for_attempt(4), Duration::from_secs(5));
}

#[test]
fn given_default_policy_then_original_constants_apply() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_attempts(), DEFAULT_MAX_ATTEMPTS);
    assert_eq!(policy.base_delay(), Duration::from_secs(1));
    assert_eq!(policy.max_delay(), Duration::from_secs(10));
    for code in [408, 429, 500, 502, 503, 504] {
        assert!(policy.is_retryable_status(code));
    }
    assert!(!policy.is_retryable_status(401));
    assert!(!policy.is_retryable_status(404));
}
