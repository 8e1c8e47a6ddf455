use std::sync::Arc;
use std::time::Duration;

use auth0_export::api::{ApiError, ApiOperation};
use auth0_export::executor::RequestExecutor;
use auth0_export::shutdown::ShutdownCoordinator;

use crate::common::{status, FakeApi};

#[tokio::test]
async fn shutdown_notifies_waiters() {
    let shutdown = ShutdownCoordinator::shared();
    let waiter = {
        let handle = shutdown.clone();
        tokio::spawn(async move {
            handle.wait_for_shutdown().await;
            true
        })
    };

    // Give the task time to start waiting
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.request_shutdown();

    let result = tokio::time::timeout(Duration::from_secs(1), waiter).await;
    assert!(result.is_ok());
}

/// Requesting shutdown before anyone waits must not deadlock the waiter.
#[tokio::test]
async fn shutdown_requested_before_wait_returns_immediately() {
    let shutdown = ShutdownCoordinator::shared();
    shutdown.request_shutdown();

    let handle = shutdown.clone();
    let waiter = tokio::spawn(async move {
        handle.wait_for_shutdown().await;
        true
    });

    let result = tokio::time::timeout(Duration::from_secs(1), waiter).await;
    assert!(result.is_ok(), "wait_for_shutdown() deadlocked despite shutdown already requested");
}

#[tokio::test]
async fn shutdown_concurrent_waiters_all_notified() {
    let shutdown = ShutdownCoordinator::shared();

    let mut waiters = Vec::new();
    for _ in 0..10 {
        let handle = shutdown.clone();
        waiters.push(tokio::spawn(async move {
            handle.wait_for_shutdown().await;
        }));
    }

    tokio::time::sleep(Duration::from_millis(10)).await;
    shutdown.request_shutdown();

    for waiter in waiters {
        let result = tokio::time::timeout(Duration::from_secs(1), waiter).await;
        assert!(result.is_ok(), "A waiter was not notified of shutdown");
    }
}

/// A backoff sleep in progress is interrupted by shutdown.
#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_backoff_sleep() {
    let api = FakeApi::new(|_| Err(status(503)));
    let shutdown = ShutdownCoordinator::shared();
    let executor =
        RequestExecutor::new(api.clone(), 2.0).with_shutdown(Arc::clone(&shutdown));

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            shutdown.request_shutdown();
        }
    });

    let started = tokio::time::Instant::now();
    let result = executor
        .execute(&ApiOperation::GetUser {
            user_id: "auth0|1".into(),
        })
        .await;

    assert_eq!(result.unwrap_err(), ApiError::Cancelled);
    assert_eq!(api.call_count(), 1);
    assert!(started.elapsed() < Duration::from_secs(1));
}
