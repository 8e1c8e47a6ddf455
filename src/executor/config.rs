//! Request executor configuration constants

use std::time::Duration;

/// Maximum number of attempts per remote call (including the first).
pub const MAX_RETRIES: u32 = 5;

/// Remaining-quota hint below which a successful call earns an extra pause.
pub const LOW_QUOTA_THRESHOLD: u32 = 5;

/// Extra pause taken when the remaining quota drops below the threshold.
pub const LOW_QUOTA_PAUSE: Duration = Duration::from_secs(1);

/// Factor applied to the throttle interval on each rate-limit hit.
pub const WIDEN_FACTOR: f64 = 1.5;

/// Upper bound for the widened throttle interval.
pub const INTERVAL_CEILING: Duration = Duration::from_secs(2);

/// Default requests per second when none is configured.
pub const DEFAULT_REQUESTS_PER_SECOND: f64 = 2.0;

/// Page size for top-level listings (users, roles, organizations).
pub const TOP_LEVEL_PAGE_SIZE: u32 = 100;

/// Page size for organization member role listings.
pub const MEMBER_ROLES_PAGE_SIZE: u32 = 50;

/// Exponent cap so very large retry budgets cannot overflow a `Duration`.
const MAX_BACKOFF_EXPONENT: u32 = 16;

/// Calculate exponential backoff delay: `2^attempt + jitter` seconds.
///
/// `jitter` is expected in `[0, 1)`; values outside are clamped.
pub fn calculate_backoff(attempt: u32, jitter: f64) -> Duration {
    let jitter = if jitter.is_finite() {
        jitter.clamp(0.0, 0.999_999)
    } else {
        0.0
    };
    let base = 2f64.powi(attempt.min(MAX_BACKOFF_EXPONENT) as i32);
    Duration::from_secs_f64(base + jitter)
}
