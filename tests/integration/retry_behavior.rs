//! Attempt budget wiring for `--max-retries`

use clap::Parser;

use auth0_export::api::{ApiError, ApiOperation};
use auth0_export::cli::Cli;
use auth0_export::executor::RequestExecutor;

use crate::common::{rate_limited, status, FakeApi};

fn list_roles() -> ApiOperation {
    ApiOperation::ListRoles {
        page: 0,
        per_page: 100,
    }
}

#[tokio::test(start_paused = true)]
async fn test_cli_max_retries_bounds_attempts() {
    let cli = Cli::parse_from(["auth0-export", "list", "roles", "--max-retries", "2"]);
    let api = FakeApi::new(|_| Err(status(500)));
    let executor = RequestExecutor::new(api.clone(), 10.0).with_max_retries(cli.max_retries);

    assert_eq!(executor.policy().max_retries(), 2);
    let result = executor.execute(&list_roles()).await;

    assert_eq!(result.unwrap_err(), status(500));
    assert_eq!(api.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_default_budget_is_five_attempts() {
    let cli = Cli::parse_from(["auth0-export", "list", "roles"]);
    let api = FakeApi::new(|_| Err(rate_limited()));
    let executor = RequestExecutor::new(api.clone(), 10.0).with_max_retries(cli.max_retries);

    let result = executor.execute(&list_roles()).await;

    assert!(matches!(result, Err(ApiError::Status { status: 429, .. })));
    assert_eq!(api.call_count(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_single_attempt_budget_never_retries() {
    let api = FakeApi::new(|_| Err(ApiError::Network("connection reset".into())));
    let executor = RequestExecutor::new(api.clone(), 10.0).with_max_retries(1);

    assert!(executor.execute(&list_roles()).await.is_err());
    assert_eq!(api.call_count(), 1);
}
