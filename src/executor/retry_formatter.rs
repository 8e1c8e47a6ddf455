//! Retry message formatting
//!
//! Keeps retry and failure log lines consistent across every API operation.

use std::time::Duration;

use crate::api::ApiError;

/// Classification of retry errors for user messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryErrorType {
    /// Transport failure (connect, timeout, reset)
    Network,
    /// HTTP 429 or rate-limit message
    RateLimit,
    /// HTTP 5xx server error
    ServerError(u16),
    /// Authentication failures (401/403)
    AuthFailed(u16),
    /// 404 on a user, organization or role
    NotFound,
    /// Other client errors (4xx, except 429)
    ClientError(u16),
    /// Undecodable response
    Parse,
    /// Generic fallback when no better classification fits
    Generic,
}

impl RetryErrorType {
    /// Classify an API error.
    pub fn from_error(error: &ApiError) -> Self {
        if error.is_rate_limit() {
            return Self::RateLimit;
        }
        match error {
            ApiError::Status { status, .. } => match *status {
                401 | 403 => Self::AuthFailed(*status),
                404 => Self::NotFound,
                s if s >= 500 => Self::ServerError(s),
                s => Self::ClientError(s),
            },
            ApiError::Network(_) => Self::Network,
            ApiError::Parse(_) => Self::Parse,
            ApiError::Auth(_) => Self::AuthFailed(401),
            _ => Self::Generic,
        }
    }

    /// User-friendly description string used inside retry log messages.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "network error",
            Self::RateLimit => "rate limit exceeded",
            Self::ServerError(code) => match code {
                500 => "internal server error",
                502 => "bad gateway",
                503 => "service unavailable",
                504 => "gateway timeout",
                _ => "server error",
            },
            Self::AuthFailed(code) => match code {
                403 => "insufficient scope (403)",
                _ => "authentication failed (401)",
            },
            Self::NotFound => "resource not found",
            Self::ClientError(_) => "client error",
            Self::Parse => "unreadable response",
            Self::Generic => "request failed",
        }
    }

    /// Suggested remediation presented after the final failure.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Network => "Check network connectivity and the tenant domain",
            Self::RateLimit => "Lower AUTH0_RATE_LIMIT_PER_SEC or --rate-limit",
            Self::ServerError(_) => "Auth0 may be experiencing issues, try again later",
            Self::AuthFailed(_) => {
                "Verify the client credentials and the Management API scopes granted to them"
            }
            Self::NotFound => "Check the user, organization and role ids",
            Self::ClientError(_) => "Review the request parameters",
            Self::Parse => "The tenant returned an unexpected payload; retry with RUST_LOG=debug",
            Self::Generic => "Try again, or increase --max-retries",
        }
    }
}

/// Context for formatting retry messages.
#[derive(Debug, Clone)]
pub struct RetryContext {
    /// Current attempt number (1-based)
    pub attempt: u32,
    /// Maximum number of attempts configured
    pub max_attempts: u32,
    /// Type of error that triggered retry
    pub error_type: RetryErrorType,
    /// Backoff duration until next attempt
    pub backoff_duration: Duration,
    /// Operation being retried (e.g. "list_users")
    pub operation: String,
    /// Original error message for details
    pub error_message: String,
}

impl RetryContext {
    /// Build a context from a failed attempt.
    pub fn new(
        attempt: u32,
        max_attempts: u32,
        error: &ApiError,
        backoff_duration: Duration,
        operation: impl Into<String>,
    ) -> Self {
        Self {
            attempt,
            max_attempts,
            error_type: RetryErrorType::from_error(error),
            backoff_duration,
            operation: operation.into(),
            error_message: error.to_string(),
        }
    }

    /// Format standardized retry message with attempt counters and context.
    pub fn format_retry(&self) -> String {
        format!(
            "Retrying (attempt {}/{}) after {} - waiting {:.1} seconds... ({})",
            self.attempt,
            self.max_attempts,
            self.error_type.description(),
            self.backoff_duration.as_secs_f64(),
            self.operation
        )
    }

    /// Format final failure summary with actionable suggestions.
    pub fn format_failure(&self) -> String {
        [
            format!(
                "[FAILED] {} failed after {} attempts",
                self.operation, self.attempt
            ),
            format!("  Last error: {}", self.error_message),
            format!("  Suggestion: {}", self.error_type.suggestion()),
        ]
        .join("\n")
    }
}
