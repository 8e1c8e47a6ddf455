//! Throttling, backoff, and the retrying request executor

pub mod backoff;
pub mod clock;
pub mod config;
pub mod request;
pub mod retry_formatter;
pub mod throttle;

pub use backoff::{BackoffPolicy, FailureClass, RetryDecision};
pub use clock::{Clock, ManualClock, SharedClock, TokioClock};
pub use request::RequestExecutor;
pub use throttle::Throttle;
