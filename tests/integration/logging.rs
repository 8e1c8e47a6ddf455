//! Integration tests for logging and tracing

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[test]
fn test_tracing_subscriber_initialization() {
    let result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("auth0_export=debug")),
        )
        .with_test_writer()
        .try_init();

    // Either succeeds or fails because already initialized (both are OK)
    assert!(result.is_ok() || result.is_err());
}

#[test]
fn test_tracing_json_format() {
    let result = tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::new("auth0_export=info"))
        .with_test_writer()
        .try_init();

    assert!(result.is_ok() || result.is_err());
}

#[test]
fn test_quiet_and_module_filters_parse() {
    for directive in [
        "auth0_export=warn",
        "auth0_export=info",
        "warn,auth0_export::executor=debug",
    ] {
        assert!(directive.parse::<EnvFilter>().is_ok(), "{directive}");
    }
}

#[test]
fn test_structured_logging_fields() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("auth0_export=debug"))
        .with_test_writer()
        .try_init();

    let span = tracing::info_span!("export", format = "csv");
    let _enter = span.enter();
    info!(user_id = "auth0|1", organizations = 2, "Aggregated user record");
    warn!(operation = "list_users", remaining = 3, "Rate limit warning");
}
