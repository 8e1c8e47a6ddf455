//! Tenant configuration
//!
//! Values resolve in order: explicit CLI flag, process environment, then the
//! `.env` file (loaded into the environment beforehand, never overriding
//! variables that are already set).

use secrecy::{ExposeSecret, Secret};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::executor::config::DEFAULT_REQUESTS_PER_SECOND;

/// Tenant domain variable.
pub const ENV_DOMAIN: &str = "AUTH0_DOMAIN";
/// Machine-to-machine client id variable.
pub const ENV_CLIENT_ID: &str = "AUTH0_CLIENT_ID";
/// Machine-to-machine client secret variable.
pub const ENV_CLIENT_SECRET: &str = "AUTH0_CLIENT_SECRET";
/// Token audience variable.
pub const ENV_AUDIENCE: &str = "AUTH0_AUDIENCE";
/// Requests-per-second variable.
pub const ENV_RATE_LIMIT: &str = "AUTH0_RATE_LIMIT_PER_SEC";

/// Substrings marking values copied from a template and never filled in.
const PLACEHOLDER_PATTERNS: [&str; 4] = ["your-tenant", "your_client", "example.com", "your-domain"];

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required values are unset or still template placeholders
    #[error("missing or placeholder credentials: {}", .0.join(", "))]
    Incomplete(Vec<&'static str>),

    /// A value is present but unusable
    #[error("invalid value for {key}: {message}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// What is wrong with it
        message: String,
    },

    /// An explicitly requested env file could not be loaded
    #[error("failed to load env file {}: {message}", path.display())]
    EnvFile {
        /// Path that was requested
        path: PathBuf,
        /// Loader error
        message: String,
    },
}

/// Values supplied on the command line; they take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Tenant domain
    pub domain: Option<String>,
    /// Client id
    pub client_id: Option<String>,
    /// Client secret
    pub client_secret: Option<String>,
    /// Token audience
    pub audience: Option<String>,
    /// Requests per second
    pub requests_per_second: Option<f64>,
}

/// Resolved tenant connection settings.
#[derive(Clone)]
pub struct TenantConfig {
    /// Tenant domain, e.g. `acme.eu.auth0.com` (may carry an explicit scheme)
    pub domain: String,
    /// Client id
    pub client_id: String,
    /// Client secret
    pub client_secret: Secret<String>,
    /// Token audience
    pub audience: String,
    /// Requests per second for the throttle
    pub requests_per_second: f64,
}

impl TenantConfig {
    /// Resolve from overrides and the process environment.
    pub fn from_env(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::resolve(overrides, |key| std::env::var(key).ok())
    }

    /// Resolve from overrides and an arbitrary variable lookup.
    pub fn resolve<F>(overrides: ConfigOverrides, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |flag: Option<String>, key: &str| {
            flag.or_else(|| lookup(key))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let domain = pick(overrides.domain, ENV_DOMAIN);
        let client_id = pick(overrides.client_id, ENV_CLIENT_ID);
        let client_secret = pick(overrides.client_secret, ENV_CLIENT_SECRET);

        let mut incomplete = Vec::new();
        for (key, value) in [
            (ENV_DOMAIN, &domain),
            (ENV_CLIENT_ID, &client_id),
            (ENV_CLIENT_SECRET, &client_secret),
        ] {
            if value.as_deref().map_or(true, is_placeholder) {
                incomplete.push(key);
            }
        }

        let (Some(domain), Some(client_id), Some(client_secret)) =
            (domain, client_id, client_secret)
        else {
            return Err(ConfigError::Incomplete(incomplete));
        };
        if !incomplete.is_empty() {
            return Err(ConfigError::Incomplete(incomplete));
        }

        let domain = normalize_domain(&domain);
        let audience = pick(overrides.audience, ENV_AUDIENCE)
            .unwrap_or_else(|| format!("https://{}/api/v2/", host_of(&domain)));

        let requests_per_second = match overrides.requests_per_second {
            Some(rps) => rps,
            None => match lookup(ENV_RATE_LIMIT).filter(|v| !v.trim().is_empty()) {
                Some(raw) => raw.trim().parse::<f64>().map_err(|e| ConfigError::Invalid {
                    key: ENV_RATE_LIMIT,
                    message: format!("'{raw}' is not a number ({e})"),
                })?,
                None => DEFAULT_REQUESTS_PER_SECOND,
            },
        };
        if !(requests_per_second.is_finite() && requests_per_second > 0.0) {
            return Err(ConfigError::Invalid {
                key: ENV_RATE_LIMIT,
                message: format!("must be a positive number, got {requests_per_second}"),
            });
        }

        Ok(Self {
            domain,
            client_id,
            client_secret: Secret::new(client_secret),
            audience,
            requests_per_second,
        })
    }

    /// Tenant root URL, `https://{domain}` unless the domain carries a scheme.
    pub fn base_url(&self) -> String {
        if self.domain.contains("://") {
            self.domain.clone()
        } else {
            format!("https://{}", self.domain)
        }
    }

    /// Management API root, `{base}/api/v2/`.
    pub fn api_url(&self) -> String {
        format!("{}/api/v2/", self.base_url())
    }

    /// Client-credentials token endpoint.
    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.base_url())
    }

    /// Client secret for the token request.
    pub fn expose_client_secret(&self) -> &str {
        self.client_secret.expose_secret()
    }
}

impl fmt::Debug for TenantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantConfig")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("audience", &self.audience)
            .field("requests_per_second", &self.requests_per_second)
            .finish()
    }
}

fn is_placeholder(value: &str) -> bool {
    PLACEHOLDER_PATTERNS.iter().any(|p| value.contains(p))
}

fn normalize_domain(domain: &str) -> String {
    let trimmed = domain.trim_end_matches('/');
    trimmed
        .strip_prefix("https://")
        .unwrap_or(trimmed)
        .to_string()
}

fn host_of(domain: &str) -> &str {
    domain.split_once("://").map_or(domain, |(_, host)| host)
}

/// Load a `.env` file into the process environment.
///
/// With an explicit `path` the file must exist. Without one, `./.env` is
/// loaded when present. Variables already set are left untouched.
/// Returns the path that was loaded, if any.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    match path {
        Some(path) => {
            dotenvy::from_path(path).map_err(|e| ConfigError::EnvFile {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            info!("Loaded credentials from {}", path.display());
            Ok(Some(path.to_path_buf()))
        }
        None => match dotenvy::dotenv() {
            Ok(loaded) => {
                info!("Loaded credentials from {}", loaded.display());
                Ok(Some(loaded))
            }
            Err(e) if e.not_found() => {
                debug!("No .env file found, using process environment");
                Ok(None)
            }
            Err(e) => Err(ConfigError::EnvFile {
                path: PathBuf::from(".env"),
                message: e.to_string(),
            }),
        },
    }
}
