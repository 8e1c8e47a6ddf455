//! CLI error types and conversions

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::export::ExportError;
use crate::metrics::MetricsError;
use crate::output::OutputError;

/// Exit status used when the run was interrupted.
pub const EXIT_INTERRUPTED: i32 = 130;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// API error
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Export error
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// Output error
    #[error("output error: {0}")]
    Output(#[from] OutputError),

    /// Metrics setup error
    #[error("metrics error: {0}")]
    Metrics(#[from] MetricsError),

    /// JSON rendering error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The requested user does not exist
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Whether this error stems from a shutdown request.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            CliError::Api(ApiError::Cancelled) | CliError::Export(ExportError::Cancelled)
        )
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        if self.is_cancelled() {
            EXIT_INTERRUPTED
        } else {
            1
        }
    }
}
