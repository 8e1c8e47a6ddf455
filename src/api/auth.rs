//! Client-credentials token exchange.
//!
//! One token is fetched at startup. A failed exchange is fatal: it is never
//! retried through the executor.

use secrecy::Secret;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{ApiError, ApiResult};
use crate::config::TenantConfig;

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
    audience: &'a str,
}

/// OAuth2 token response from the tenant.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[allow(dead_code)]
    #[serde(default)]
    token_type: Option<String>,
}

/// Exchange client credentials for a Management API access token.
#[instrument(skip(http, config), fields(domain = %config.domain))]
pub async fn fetch_token(
    http: &reqwest::Client,
    config: &TenantConfig,
) -> ApiResult<Secret<String>> {
    let request = TokenRequest {
        grant_type: "client_credentials",
        client_id: &config.client_id,
        client_secret: config.expose_client_secret(),
        audience: &config.audience,
    };

    let response = http
        .post(config.token_url())
        .json(&request)
        .send()
        .await
        .map_err(|e| ApiError::Auth(format!("token request failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Auth(format!(
            "token request failed with status {status}: {body}"
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| ApiError::Auth(format!("failed to parse token response: {e}")))?;

    debug!(
        expires_in = token.expires_in.unwrap_or_default(),
        "Acquired Management API token"
    );

    Ok(Secret::new(token.access_token))
}
