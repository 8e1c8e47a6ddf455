//! reqwest-backed Management API client
//!
//! Performs exactly one HTTP call per [`AdminApi::invoke`]; throttling and
//! retries happen in the executor above it.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::auth::fetch_token;
use super::{AdminApi, ApiError, ApiOperation, ApiResponse, ApiResult};
use crate::config::TenantConfig;

/// HTTP connect timeout (seconds) - time to establish TCP connection
const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
/// HTTP request timeout (seconds) - overall time for the entire request
const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Header carrying the remaining request quota.
pub const RATE_LIMIT_REMAINING_HEADER: &str = "X-RateLimit-Remaining";

/// Build the shared HTTP client with explicit timeouts.
pub fn build_http_client() -> ApiResult<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
        .user_agent(concat!("auth0-export/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ApiError::Other(format!("failed to build HTTP client: {e}")))
}

/// Management API v2 client holding one bearer token.
pub struct ManagementClient {
    http: Client,
    api_url: Url,
    token: Secret<String>,
}

impl ManagementClient {
    /// Client for an explicit API root (e.g. `https://acme.auth0.com/api/v2/`).
    pub fn new(http: Client, api_url: &str, token: Secret<String>) -> ApiResult<Self> {
        let mut api_url = Url::parse(api_url)
            .map_err(|e| ApiError::InvalidRequest(format!("bad API URL '{api_url}': {e}")))?;
        if api_url.cannot_be_a_base() {
            return Err(ApiError::InvalidRequest(format!(
                "API URL '{api_url}' cannot carry a path"
            )));
        }
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }

        Ok(Self {
            http,
            api_url,
            token,
        })
    }

    /// Fetch a token for `config` and build a client for its tenant.
    pub async fn connect(config: &TenantConfig) -> ApiResult<Self> {
        let http = build_http_client()?;
        let token = fetch_token(&http, config).await?;
        Self::new(http, &config.api_url(), token)
    }

    /// API root this client talks to.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Full URL for an operation (path segments are percent-encoded).
    pub fn url_for(&self, operation: &ApiOperation) -> ApiResult<Url> {
        let mut url = self.api_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidRequest("API URL cannot carry a path".into()))?;
            segments.pop_if_empty();
            segments.extend(operation.path_segments());
        }
        Ok(url)
    }
}

#[async_trait]
impl AdminApi for ManagementClient {
    async fn invoke(&self, operation: &ApiOperation) -> ApiResult<ApiResponse> {
        let url = self.url_for(operation)?;
        debug!(operation = operation.name(), %url, "Sending request");

        let mut request = self
            .http
            .request(operation.method(), url)
            .bearer_auth(self.token.expose_secret())
            .query(&operation.query());
        if let Some(body) = operation.body() {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(network_error)?;

        let status = response.status();
        let rate_limit_remaining = parse_rate_limit_remaining(response.headers());
        let text = response.text().await.map_err(network_error)?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&text, status.canonical_reason()),
            });
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| ApiError::Parse(e.to_string()))?
        };

        Ok(ApiResponse {
            body,
            rate_limit_remaining,
        })
    }
}

/// Transport failure without the request URL (user ids stay out of the message).
fn network_error(e: reqwest::Error) -> ApiError {
    let kind = if e.is_timeout() {
        "request timed out"
    } else if e.is_connect() {
        "connection failed"
    } else if e.is_body() || e.is_decode() {
        "failed to read response body"
    } else {
        "request failed"
    };
    ApiError::Network(format!("{kind}: {}", e.without_url()))
}

/// Extract `X-RateLimit-Remaining`, ignoring malformed values.
pub fn parse_rate_limit_remaining(headers: &HeaderMap) -> Option<u32> {
    let raw = headers.get(RATE_LIMIT_REMAINING_HEADER)?.to_str().ok()?;
    match raw.trim().parse::<u32>() {
        Ok(remaining) => Some(remaining),
        Err(e) => {
            warn!("Failed to parse rate limit header '{}': {}", raw, e);
            None
        }
    }
}

/// Prefer the `message` of an Auth0 error body, then the raw body, then the reason phrase.
fn error_message(body: &str, reason: Option<&str>) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(message) = map.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        reason.unwrap_or("unknown error").to_string()
    } else {
        trimmed.to_string()
    }
}
