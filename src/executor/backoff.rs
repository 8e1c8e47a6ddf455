//! Backoff policy
//!
//! Decides, for a failed attempt, whether to retry, how long to wait, and
//! whether the throttle should widen.

use rand::Rng;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::config::{calculate_backoff, INTERVAL_CEILING, MAX_RETRIES, WIDEN_FACTOR};

/// Failure classes the policy distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// HTTP 429 or an explicit rate-limit message
    RateLimit,
    /// Anything else worth retrying
    Transient,
}

/// Outcome of consulting the policy after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RetryDecision {
    /// Sleep for `delay`, then try again
    Retry {
        /// Backoff delay
        delay: Duration,
        /// Whether the throttle interval should grow
        widen_throttle: bool,
    },
    /// Give up and return the error
    Propagate {
        /// Whether the throttle interval should grow before giving up
        widen_throttle: bool,
    },
}

/// Source of jitter in `[0, 1)`.
pub type JitterSource = Arc<dyn Fn() -> f64 + Send + Sync>;

/// Exponential backoff with jitter and adaptive throttle widening.
#[derive(Clone)]
pub struct BackoffPolicy {
    max_retries: u32,
    widen_factor: f64,
    interval_ceiling: Duration,
    jitter: JitterSource,
}

impl BackoffPolicy {
    /// Policy with `max_retries` attempts and random jitter.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries: max_retries.max(1),
            widen_factor: WIDEN_FACTOR,
            interval_ceiling: INTERVAL_CEILING,
            jitter: Arc::new(|| rand::thread_rng().gen_range(0.0..1.0)),
        }
    }

    /// Replace the jitter source (tests pin it to a constant).
    pub fn with_jitter<F>(mut self, jitter: F) -> Self
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        self.jitter = Arc::new(jitter);
        self
    }

    /// Override the widen factor and ceiling.
    pub fn with_widening(mut self, factor: f64, ceiling: Duration) -> Self {
        self.widen_factor = factor;
        self.interval_ceiling = ceiling;
        self
    }

    /// Attempt budget.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Throttle widen factor.
    pub fn widen_factor(&self) -> f64 {
        self.widen_factor
    }

    /// Throttle interval ceiling.
    pub fn interval_ceiling(&self) -> Duration {
        self.interval_ceiling
    }

    /// Backoff delay for a 0-based attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, (self.jitter)())
    }

    /// Decide what to do after `attempt` (0-based) failed with `class`.
    ///
    /// Both classes draw from the same attempt budget. Once the last attempt
    /// has failed the error propagates; a rate-limit hit still widens.
    pub fn decide(&self, attempt: u32, class: FailureClass) -> RetryDecision {
        let widen_throttle = class == FailureClass::RateLimit;

        if attempt + 1 >= self.max_retries {
            return RetryDecision::Propagate { widen_throttle };
        }

        RetryDecision::Retry {
            delay: self.delay_for(attempt),
            widen_throttle,
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(MAX_RETRIES)
    }
}

impl fmt::Debug for BackoffPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackoffPolicy")
            .field("max_retries", &self.max_retries)
            .field("widen_factor", &self.widen_factor)
            .field("interval_ceiling", &self.interval_ceiling)
            .finish_non_exhaustive()
    }
}
