//! Minimum-spacing throttle
//!
//! One throttle gates every outbound call of a client. The interval starts at
//! `1 / requests_per_second` and only ever grows, up to a ceiling, when the
//! tenant reports rate-limit pressure.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::clock::SharedClock;
use super::config::INTERVAL_CEILING;

#[derive(Debug)]
struct ThrottleState {
    last_request: Option<Instant>,
    min_interval: Duration,
}

/// Spaces requests by at least `min_interval`.
///
/// State sits behind an async mutex held across the wait, so concurrent
/// callers are serialized and the spacing contract holds tenant-wide.
pub struct Throttle {
    state: Mutex<ThrottleState>,
    clock: SharedClock,
}

impl Throttle {
    /// Throttle with an explicit interval.
    pub fn new(min_interval: Duration, clock: SharedClock) -> Self {
        Self {
            state: Mutex::new(ThrottleState {
                last_request: None,
                min_interval,
            }),
            clock,
        }
    }

    /// Throttle allowing `requests_per_second` calls per second.
    ///
    /// Non-positive or non-finite rates fall back to the ceiling interval.
    pub fn per_second(requests_per_second: f64, clock: SharedClock) -> Self {
        let interval = if requests_per_second.is_finite() && requests_per_second > 0.0 {
            Duration::try_from_secs_f64(1.0 / requests_per_second).unwrap_or(INTERVAL_CEILING)
        } else {
            warn!(
                requests_per_second,
                "Invalid request rate, using {:?} spacing", INTERVAL_CEILING
            );
            INTERVAL_CEILING
        };
        Self::new(interval, clock)
    }

    /// Block until `min_interval` has passed since the last request, then
    /// record the current time as the new last request. Returns that time.
    pub async fn wait(&self) -> Instant {
        let mut state = self.state.lock().await;

        if let Some(last) = state.last_request {
            let elapsed = self.clock.now().saturating_duration_since(last);
            if elapsed < state.min_interval {
                let remaining = state.min_interval - elapsed;
                debug!("Throttling for {:?}", remaining);
                self.clock.sleep(remaining).await;
            }
        }

        let now = self.clock.now();
        state.last_request = Some(now);
        now
    }

    /// Grow the interval by `factor`, clamped at `ceiling`. Never shrinks.
    ///
    /// Returns the interval in effect afterwards.
    pub async fn widen(&self, factor: f64, ceiling: Duration) -> Duration {
        let mut state = self.state.lock().await;
        let current = state.min_interval;
        let widened = Duration::try_from_secs_f64(current.as_secs_f64() * factor.max(1.0))
            .unwrap_or(ceiling)
            .min(ceiling);
        state.min_interval = current.max(widened);

        if state.min_interval != current {
            debug!(
                "Throttle interval widened from {:?} to {:?}",
                current, state.min_interval
            );
        }
        state.min_interval
    }

    /// Current minimum interval.
    pub async fn min_interval(&self) -> Duration {
        self.state.lock().await.min_interval
    }

    /// Time recorded by the most recent [`Throttle::wait`].
    pub async fn last_request_time(&self) -> Option<Instant> {
        self.state.lock().await.last_request
    }
}
