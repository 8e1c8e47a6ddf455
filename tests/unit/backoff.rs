//! Unit tests for the backoff policy

use std::time::Duration;

use auth0_export::executor::config::calculate_backoff;
use auth0_export::executor::{BackoffPolicy, FailureClass, RetryDecision};

#[test]
fn test_generic_delay_within_jitter_window() {
    for attempt in 0..6 {
        let policy = BackoffPolicy::new(5);
        let delay = policy.delay_for(attempt).as_secs_f64();
        let base = 2f64.powi(attempt as i32);
        assert!(
            delay >= base && delay < base + 1.0,
            "attempt {attempt}: {delay}s outside [{base}, {})",
            base + 1.0
        );
    }
}

#[test]
fn test_pinned_jitter_is_exact() {
    let policy = BackoffPolicy::new(5).with_jitter(|| 0.25);
    assert_eq!(policy.delay_for(0), Duration::from_millis(1250));
    assert_eq!(policy.delay_for(3), Duration::from_millis(8250));
    assert_eq!(calculate_backoff(2, 0.5), Duration::from_millis(4500));
}

#[test]
fn test_rate_limit_retries_share_budget() {
    let policy = BackoffPolicy::new(3).with_jitter(|| 0.0);

    assert_eq!(
        policy.decide(0, FailureClass::RateLimit),
        RetryDecision::Retry {
            delay: Duration::from_secs(1),
            widen_throttle: true
        }
    );
    assert_eq!(
        policy.decide(1, FailureClass::Transient),
        RetryDecision::Retry {
            delay: Duration::from_secs(2),
            widen_throttle: false
        }
    );
    assert_eq!(
        policy.decide(2, FailureClass::RateLimit),
        RetryDecision::Propagate {
            widen_throttle: true
        }
    );
    assert_eq!(
        policy.decide(2, FailureClass::Transient),
        RetryDecision::Propagate {
            widen_throttle: false
        }
    );
}

#[test]
fn test_budget_never_below_one() {
    let policy = BackoffPolicy::new(0);
    assert_eq!(policy.max_retries(), 1);
    assert!(matches!(
        policy.decide(0, FailureClass::Transient),
        RetryDecision::Propagate { .. }
    ));
}
