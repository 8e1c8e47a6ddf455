//! Shared fixtures: a fake Management API and executor builders

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use auth0_export::api::{AdminApi, ApiError, ApiOperation, ApiResponse, ApiResult};
use auth0_export::executor::{BackoffPolicy, ManualClock, RequestExecutor};

type Handler = Box<dyn Fn(&ApiOperation) -> ApiResult<ApiResponse> + Send + Sync>;

/// In-memory [`AdminApi`] that answers through a handler and logs every call.
pub struct FakeApi {
    handler: Handler,
    calls: Mutex<Vec<ApiOperation>>,
}

impl FakeApi {
    /// Answer every call with `handler`.
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&ApiOperation) -> ApiResult<ApiResponse> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Answer calls from a fixed script, then with an empty body.
    pub fn scripted(responses: Vec<ApiResult<ApiResponse>>) -> Arc<Self> {
        let queue = Mutex::new(VecDeque::from(responses));
        Self::new(move |_| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ApiResponse::new(Value::Null)))
        })
    }

    /// Every operation received, in order.
    pub fn calls(&self) -> Vec<ApiOperation> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls received.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl AdminApi for FakeApi {
    async fn invoke(&self, operation: &ApiOperation) -> ApiResult<ApiResponse> {
        self.calls.lock().unwrap().push(operation.clone());
        (self.handler)(operation)
    }
}

/// Executor on a manual clock, 2 req/s, zero jitter, 5 attempts.
pub fn executor(api: Arc<FakeApi>, clock: Arc<ManualClock>) -> RequestExecutor {
    executor_with_retries(api, clock, 5)
}

/// Executor on a manual clock with a custom attempt budget.
pub fn executor_with_retries(
    api: Arc<FakeApi>,
    clock: Arc<ManualClock>,
    max_retries: u32,
) -> RequestExecutor {
    RequestExecutor::with_clock(api, 2.0, clock)
        .with_policy(BackoffPolicy::new(max_retries).with_jitter(|| 0.0))
}

/// HTTP status error.
pub fn status(code: u16) -> ApiError {
    ApiError::Status {
        status: code,
        message: format!("status {code}"),
    }
}

/// 429 error.
pub fn rate_limited() -> ApiError {
    status(429)
}

/// `{"users": [...]}` with ids `auth0|{start}..auth0|{start+count}`.
pub fn users_page(start: usize, count: usize) -> ApiResponse {
    let users: Vec<Value> = (start..start + count)
        .map(|i| json!({"user_id": format!("auth0|{i}"), "email": format!("user{i}@acme.io")}))
        .collect();
    ApiResponse::new(json!({ "users": users, "total": count }))
}

/// `{"roles": [...]}` with `count` roles named `{prefix}-{i}`.
pub fn roles_page(prefix: &str, start: usize, count: usize) -> ApiResponse {
    let roles: Vec<Value> = (start..start + count)
        .map(|i| json!({"id": format!("rol_{prefix}_{i}"), "name": format!("{prefix}-{i}")}))
        .collect();
    ApiResponse::new(json!({ "roles": roles }))
}

/// Bare array body.
pub fn array(items: Vec<Value>) -> ApiResponse {
    ApiResponse::new(Value::Array(items))
}

/// Empty success body.
pub fn ok_empty() -> ApiResult<ApiResponse> {
    Ok(ApiResponse::new(Value::Null))
}
