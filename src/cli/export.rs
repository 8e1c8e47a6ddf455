//! Full export command

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use super::{Cli, CliError, OutputFormat};
use crate::config::TenantConfig;
use crate::export::{ExportDriver, ExportSummary, LoggingObserver, ProgressObserver};
use crate::output::path::default_export_path;
use crate::output::ExportFormat;
use crate::shutdown::SharedShutdown;

/// Arguments for a full export
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// File format (csv or json)
    #[arg(long, default_value = "csv")]
    pub format: ExportFormat,

    /// Output file (default: auth0_users_export_YYYYMMDD_HHMMSS.{csv,json})
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ExportArgs {
    /// Run the export and print a summary.
    pub async fn execute(&self, cli: &Cli, shutdown: SharedShutdown) -> Result<(), CliError> {
        let session = cli.connect(shutdown).await?;
        let path = self
            .output
            .clone()
            .unwrap_or_else(|| default_export_path(self.format));

        info!("Starting full export to {}", path.display());

        let observer: Arc<dyn ProgressObserver> =
            if cli.quiet || cli.output_format == OutputFormat::Json {
                Arc::new(LoggingObserver::new())
            } else {
                Arc::new(IndicatifObserver::new())
            };

        let summary = ExportDriver::new(&session.directory)
            .with_observer(observer)
            .export_all(self.format, &path)
            .await?;

        match cli.output_format {
            OutputFormat::Json => println!("{}", summary_json(&summary, &session.config)),
            OutputFormat::Human => print_summary(&summary, &session.config),
        }
        Ok(())
    }
}

/// Progress bar over the user list.
pub struct IndicatifObserver {
    bar: ProgressBar,
}

impl IndicatifObserver {
    /// Hidden until the total is known.
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) ETA {eta} {msg}",
        ) {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self { bar }
    }
}

impl Default for IndicatifObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for IndicatifObserver {
    fn on_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
    }

    fn on_principal(&self, index: usize, _total: usize, identifier: &str) {
        self.bar.set_position(index as u64);
        self.bar.set_message(identifier.to_string());
    }

    fn on_finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn summary_json(summary: &ExportSummary, config: &TenantConfig) -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "output_path": summary.output_path.display().to_string(),
        "users_processed": summary.users_processed,
        "rows_written": summary.rows_written,
        "elapsed_seconds": summary.elapsed.as_secs_f64(),
        "file_size_bytes": summary.file_size,
        "requests_per_second": config.requests_per_second,
    })
}

fn print_summary(summary: &ExportSummary, config: &TenantConfig) {
    println!("\nFull export completed successfully!");
    println!("Output file: {}", summary.output_path.display());
    println!("Users processed: {}", summary.users_processed);
    println!("Rows exported: {}", summary.rows_written);
    println!("Time taken: {:.1} minutes", summary.elapsed_minutes());
    println!("File size: {:.2} MB", summary.file_size_mb());
    println!("Rate limit: {} req/sec", config.requests_per_second);
}
