//! Unit tests for retry message classification

use std::time::Duration;

use auth0_export::api::ApiError;
use auth0_export::executor::retry_formatter::{RetryContext, RetryErrorType};

fn status(code: u16) -> ApiError {
    ApiError::Status {
        status: code,
        message: String::new(),
    }
}

#[test]
fn test_error_classification() {
    assert_eq!(RetryErrorType::from_error(&status(429)), RetryErrorType::RateLimit);
    assert_eq!(RetryErrorType::from_error(&status(403)), RetryErrorType::AuthFailed(403));
    assert_eq!(RetryErrorType::from_error(&status(404)), RetryErrorType::NotFound);
    assert_eq!(RetryErrorType::from_error(&status(502)), RetryErrorType::ServerError(502));
    assert_eq!(RetryErrorType::from_error(&status(409)), RetryErrorType::ClientError(409));
    assert_eq!(
        RetryErrorType::from_error(&ApiError::Network("reset".into())),
        RetryErrorType::Network
    );
    assert_eq!(
        RetryErrorType::from_error(&ApiError::Other("rate limit hit".into())),
        RetryErrorType::RateLimit
    );
}

#[test]
fn test_network_retry_message() {
    let ctx = RetryContext::new(
        1,
        3,
        &ApiError::Network("connection reset".into()),
        Duration::from_millis(1400),
        "list_user_roles",
    );
    assert_eq!(
        ctx.format_retry(),
        "Retrying (attempt 1/3) after network error - waiting 1.4 seconds... (list_user_roles)"
    );
    assert!(ctx
        .format_failure()
        .contains("Suggestion: Check network connectivity"));
}
