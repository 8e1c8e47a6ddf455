//! Management API capability
//!
//! The request executor only ever talks to an [`AdminApi`]: something that
//! takes one [`ApiOperation`] and returns a JSON response or an [`ApiError`].
//! [`http::ManagementClient`] is the production implementation; tests script
//! their own.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub mod auth;
pub mod http;
pub mod operation;
pub mod pagination;

pub use http::ManagementClient;
pub use operation::ApiOperation;
pub use pagination::{Paged, Paginator, StopRule};

use crate::executor::backoff::FailureClass;

/// Errors surfaced by the remote capability
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Non-success HTTP status returned by the API
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error body or reason phrase
        message: String,
    },

    /// Transport-level failure (connect, timeout, reset)
    #[error("network error: {0}")]
    Network(String),

    /// Response body could not be decoded
    #[error("parse error: {0}")]
    Parse(String),

    /// Token exchange failed
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Request could not be built (bad base URL, bad identifier)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Shutdown was requested while the operation was in flight
    #[error("operation cancelled")]
    Cancelled,

    /// Any other failure
    #[error("{0}")]
    Other(String),
}

impl ApiError {
    /// HTTP status, when the error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error signals rate-limit pressure.
    ///
    /// A structured status decides when present. Only opaque [`ApiError::Other`]
    /// messages are sniffed for `429` or `rate limit`; transport, parse and
    /// request errors carry client-side text (URLs, byte offsets) and never
    /// count as rate-limit pressure.
    pub fn is_rate_limit(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429,
            Self::Other(message) => {
                let message = message.to_lowercase();
                message.contains("429") || message.contains("rate limit")
            }
            _ => false,
        }
    }

    /// Classify for the backoff policy. `None` means never retry.
    pub fn failure_class(&self) -> Option<FailureClass> {
        match self {
            Self::Cancelled => None,
            err if err.is_rate_limit() => Some(FailureClass::RateLimit),
            _ => Some(FailureClass::Transient),
        }
    }
}

/// Result type for remote operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Decoded response of one remote call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// JSON body (`Null` for empty bodies)
    pub body: Value,
    /// Value of `X-RateLimit-Remaining`, when the server sent one
    pub rate_limit_remaining: Option<u32>,
}

impl ApiResponse {
    /// Response with a body and no quota hint.
    pub fn new(body: Value) -> Self {
        Self {
            body,
            rate_limit_remaining: None,
        }
    }

    /// Attach a remaining-quota hint.
    pub fn with_rate_limit_remaining(mut self, remaining: u32) -> Self {
        self.rate_limit_remaining = Some(remaining);
        self
    }

    /// Extract the listed items.
    ///
    /// A bare JSON array is taken as the item list. An object is searched for
    /// `field`; a missing or null field, or a null body, is an empty list.
    pub fn into_items<T: DeserializeOwned>(self, field: Option<&str>) -> ApiResult<Vec<T>> {
        let items = match (self.body, field) {
            (Value::Null, _) => return Ok(Vec::new()),
            (array @ Value::Array(_), _) => array,
            (Value::Object(mut map), Some(field)) => match map.remove(field) {
                None | Some(Value::Null) => return Ok(Vec::new()),
                Some(value) => value,
            },
            (other, _) => {
                return Err(ApiError::Parse(format!(
                    "expected a list{}, got {}",
                    field.map(|f| format!(" under '{f}'")).unwrap_or_default(),
                    type_name(&other)
                )))
            }
        };

        serde_json::from_value(items).map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Decode the whole body as a single record.
    pub fn into_record<T: DeserializeOwned>(self) -> ApiResult<T> {
        serde_json::from_value(self.body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Opaque remote capability: one operation in, one response out.
///
/// Implementations perform exactly one call per `invoke`; throttling and
/// retries belong to [`crate::executor::RequestExecutor`].
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// Perform a single remote call.
    async fn invoke(&self, operation: &ApiOperation) -> ApiResult<ApiResponse>;
}
