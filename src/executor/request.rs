//! Retrying request executor
//!
//! Wraps one [`AdminApi`] call in the throttle and the backoff policy:
//!
//! 1. wait on the throttle
//! 2. invoke the remote call
//! 3. on success, pause once more if the remaining quota is nearly spent
//!    (not interruptible: the result is returned either way)
//! 4. on failure, classify and let the policy decide: sleep and retry
//!    (widening the throttle on rate-limit hits) or propagate

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::backoff::{BackoffPolicy, RetryDecision};
use super::clock::{SharedClock, TokioClock};
use super::config::{LOW_QUOTA_PAUSE, LOW_QUOTA_THRESHOLD};
use super::retry_formatter::RetryContext;
use super::throttle::Throttle;
use crate::api::{AdminApi, ApiError, ApiOperation, ApiResponse, ApiResult};
use crate::metrics::{record_retry_backoff, record_throttle_interval, ApiRequestMetrics};
use crate::shutdown::SharedShutdown;

/// Throttled, retrying front door to the Management API.
pub struct RequestExecutor {
    api: Arc<dyn AdminApi>,
    throttle: Throttle,
    policy: BackoffPolicy,
    clock: SharedClock,
    shutdown: Option<SharedShutdown>,
}

impl RequestExecutor {
    /// Executor on the tokio clock with the default policy. Not interruptible
    /// until [`RequestExecutor::with_shutdown`] attaches a coordinator.
    pub fn new(api: Arc<dyn AdminApi>, requests_per_second: f64) -> Self {
        Self::with_clock(api, requests_per_second, Arc::new(TokioClock))
    }

    /// Executor on an explicit clock.
    pub fn with_clock(api: Arc<dyn AdminApi>, requests_per_second: f64, clock: SharedClock) -> Self {
        let throttle = Throttle::per_second(requests_per_second, clock.clone());
        Self {
            api,
            throttle,
            policy: BackoffPolicy::default(),
            clock,
            shutdown: None,
        }
    }

    /// Replace the backoff policy.
    pub fn with_policy(mut self, policy: BackoffPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Shorthand for a default policy with a different attempt budget.
    pub fn with_max_retries(self, max_retries: u32) -> Self {
        let policy = self.policy.clone();
        let policy = BackoffPolicy::new(max_retries)
            .with_widening(policy.widen_factor(), policy.interval_ceiling());
        self.with_policy(policy)
    }

    /// Attach a shutdown coordinator.
    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// The throttle gating every call.
    pub fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    /// The active backoff policy.
    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Whether shutdown has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|s| s.is_shutdown_requested())
    }

    /// Execute one operation with throttling and retries.
    ///
    /// Returns the first success, or the error of the final attempt.
    pub async fn execute(&self, operation: &ApiOperation) -> ApiResult<ApiResponse> {
        let max_attempts = self.policy.max_retries();
        let mut attempt: u32 = 0;

        loop {
            if self.is_cancelled() {
                return Err(ApiError::Cancelled);
            }

            self.throttle.wait().await;

            let metrics = ApiRequestMetrics::start(operation.name(), attempt + 1);
            let result = self.api.invoke(operation).await;

            let error = match result {
                Ok(response) => {
                    metrics.record_success(response.rate_limit_remaining);
                    if let Some(remaining) = response.rate_limit_remaining {
                        if remaining < LOW_QUOTA_THRESHOLD {
                            warn!(
                                operation = operation.name(),
                                remaining, "Rate limit warning: only {} requests remaining", remaining
                            );
                            // The call already succeeded; a pending shutdown is
                            // seen at the start of the next execute.
                            self.clock.sleep(LOW_QUOTA_PAUSE).await;
                        }
                    }
                    if attempt > 0 {
                        debug!(
                            operation = operation.name(),
                            "Succeeded on attempt {}/{}",
                            attempt + 1,
                            max_attempts
                        );
                    }
                    return Ok(response);
                }
                Err(error) => error,
            };

            metrics.record_error(&error);

            let Some(class) = error.failure_class() else {
                return Err(error);
            };

            match self.policy.decide(attempt, class) {
                RetryDecision::Retry {
                    delay,
                    widen_throttle,
                } => {
                    let context =
                        RetryContext::new(attempt + 1, max_attempts, &error, delay, operation.name());
                    warn!(error = %error, "{}", context.format_retry());
                    record_retry_backoff(delay, attempt + 1);

                    self.pause(delay).await?;
                    if widen_throttle {
                        self.widen().await;
                    }
                    attempt += 1;
                }
                RetryDecision::Propagate { widen_throttle } => {
                    if widen_throttle {
                        self.widen().await;
                    }
                    let context = RetryContext::new(
                        attempt + 1,
                        max_attempts,
                        &error,
                        Duration::ZERO,
                        operation.name(),
                    );
                    debug!("{}", context.format_failure());
                    return Err(error);
                }
            }
        }
    }

    async fn widen(&self) {
        let interval = self
            .throttle
            .widen(self.policy.widen_factor(), self.policy.interval_ceiling())
            .await;
        record_throttle_interval(interval);
    }

    async fn pause(&self, duration: Duration) -> ApiResult<()> {
        match &self.shutdown {
            Some(shutdown) => {
                tokio::select! {
                    biased;
                    _ = shutdown.wait_for_shutdown() => Err(ApiError::Cancelled),
                    _ = self.clock.sleep(duration) => Ok(()),
                }
            }
            None => {
                self.clock.sleep(duration).await;
                Ok(())
            }
        }
    }
}
