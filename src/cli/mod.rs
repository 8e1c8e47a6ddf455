//! CLI command implementations

pub mod error;
pub mod export;
pub mod list;
pub mod mutate;
pub mod user;

pub use error::CliError;
pub use export::ExportArgs;
pub use list::ListCommand;
pub use mutate::MutateCommand;
pub use user::UserArgs;

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use crate::api::ManagementClient;
use crate::config::{load_env_file, ConfigOverrides, TenantConfig};
use crate::executor::config::MAX_RETRIES;
use crate::executor::RequestExecutor;
use crate::export::Directory;
use crate::shutdown::SharedShutdown;

/// Auth0 user export CLI
#[derive(Parser, Debug)]
#[command(name = "auth0-export")]
#[command(about = "Export Auth0 users with their organizations and roles", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Tenant connection settings
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Output format for command results (json or human)
    #[arg(long, global = true, default_value = "human")]
    pub output_format: OutputFormat,

    /// Maximum attempts per API call, rate-limit retries included (default: 5, range: 1-10)
    #[arg(long, global = true, default_value_t = MAX_RETRIES, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub max_retries: u32,

    /// Suppress progress output
    #[arg(short, long, global = true, default_value_t = false)]
    pub quiet: bool,

    /// Serve Prometheus metrics on this address (e.g. 127.0.0.1:9000)
    #[arg(long, global = true)]
    pub metrics_addr: Option<SocketAddr>,
}

/// Credentials and rate settings. Flags override the environment.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Load variables from this file instead of ./.env
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Tenant domain (AUTH0_DOMAIN)
    #[arg(long, global = true)]
    pub domain: Option<String>,

    /// Client id (AUTH0_CLIENT_ID)
    #[arg(long, global = true)]
    pub client_id: Option<String>,

    /// Client secret (AUTH0_CLIENT_SECRET)
    #[arg(long, global = true)]
    pub client_secret: Option<String>,

    /// Token audience (AUTH0_AUDIENCE)
    #[arg(long, global = true)]
    pub audience: Option<String>,

    /// Requests per second (AUTH0_RATE_LIMIT_PER_SEC)
    #[arg(short = 'r', long = "rate-limit", global = true)]
    pub rate_limit: Option<f64>,
}

impl ConnectionArgs {
    /// Flag values as configuration overrides.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            domain: self.domain.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            audience: self.audience.clone(),
            requests_per_second: self.rate_limit,
        }
    }
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export every user with organizations and roles
    Export(ExportArgs),

    /// Show or export a single user
    User(UserArgs),

    /// List tenant roles or organizations
    #[command(subcommand)]
    List(ListCommand),

    /// Assign or remove roles and memberships
    #[command(subcommand)]
    Mutate(MutateCommand),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable output
    Human,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" => Ok(OutputFormat::Human),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}

/// A connected tenant: resolved settings and a ready directory.
pub struct Session {
    /// Resolved configuration
    pub config: TenantConfig,
    /// Lookups through the rate-limited executor
    pub directory: Directory,
}

impl Cli {
    /// Resolve configuration only (env file, environment, flags).
    pub fn resolve_config(&self) -> Result<TenantConfig, CliError> {
        load_env_file(self.connection.env_file.as_deref())?;
        Ok(TenantConfig::from_env(self.connection.overrides())?)
    }

    /// Resolve configuration, exchange the token, and build the executor.
    pub async fn connect(&self, shutdown: SharedShutdown) -> Result<Session, CliError> {
        let config = self.resolve_config()?;
        info!(
            domain = %config.domain,
            requests_per_second = config.requests_per_second,
            "Connecting to Auth0"
        );

        let client = ManagementClient::connect(&config).await?;
        let executor = RequestExecutor::new(Arc::new(client), config.requests_per_second)
            .with_max_retries(self.max_retries)
            .with_shutdown(shutdown);

        Ok(Session {
            config,
            directory: Directory::new(executor),
        })
    }

    /// Run the selected command.
    pub async fn run(&self, shutdown: SharedShutdown) -> Result<(), CliError> {
        match &self.command {
            Commands::Export(args) => args.execute(self, shutdown).await,
            Commands::User(args) => args.execute(self, shutdown).await,
            Commands::List(command) => command.execute(self, shutdown).await,
            Commands::Mutate(command) => command.execute(self, shutdown).await,
        }
    }
}
