//! Export orchestration
//!
//! Lists users (or takes a given set), aggregates each one, and streams the
//! records into a CSV or JSON writer. Shutdown is checked between users.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::aggregator::RecordAggregator;
use super::directory::Directory;
use super::progress::{LoggingObserver, ProgressObserver};
use super::{ExportError, ExportResult};
use crate::metrics::ExportMetrics;
use crate::output::{ExportFormat, ExportWriter};
use crate::User;

/// Totals reported at the end of an export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    /// Users aggregated
    pub users_processed: usize,
    /// CSV rows or JSON entries written
    pub rows_written: usize,
    /// Wall-clock duration
    pub elapsed: Duration,
    /// Output file
    pub output_path: PathBuf,
    /// Output file size in bytes
    pub file_size: u64,
}

impl ExportSummary {
    /// Duration in minutes, as shown in the summary.
    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed.as_secs_f64() / 60.0
    }

    /// File size in MiB.
    pub fn file_size_mb(&self) -> f64 {
        self.file_size as f64 / (1024.0 * 1024.0)
    }
}

/// Runs full or partial exports.
pub struct ExportDriver<'a> {
    directory: &'a Directory,
    observer: Arc<dyn ProgressObserver>,
}

impl<'a> ExportDriver<'a> {
    /// Driver that logs progress.
    pub fn new(directory: &'a Directory) -> Self {
        Self {
            directory,
            observer: Arc::new(LoggingObserver::new()),
        }
    }

    /// Replace the progress observer.
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Export every user in the tenant.
    pub async fn export_all(&self, format: ExportFormat, path: &Path) -> ExportResult<ExportSummary> {
        let users = self.directory.list_users().await;
        self.check_cancelled()?;
        self.export_users(users, format, path).await
    }

    /// Export the given users.
    pub async fn export_users(
        &self,
        users: Vec<User>,
        format: ExportFormat,
        path: &Path,
    ) -> ExportResult<ExportSummary> {
        let metrics = ExportMetrics::start(format.extension());
        let start = Instant::now();
        let mut writer = ExportWriter::create(format, path)?;

        let total = users.len();
        let aggregator = RecordAggregator::new(self.directory);
        let mut rows_written = 0;
        let mut users_processed = 0;

        self.observer.on_start(total);
        for (index, user) in users.into_iter().enumerate() {
            if let Err(e) = self.check_cancelled() {
                metrics.record_failure("cancelled");
                return Err(e);
            }

            self.observer
                .on_principal(index, total, user.display_email());
            let record = aggregator.aggregate(user).await;

            // Sub-lookups degrade to empty lists when cancelled mid-flight;
            // such a record is incomplete and must not be written.
            if let Err(e) = self.check_cancelled() {
                metrics.record_failure("cancelled");
                return Err(e);
            }

            rows_written += writer.write_record(record)?;
            users_processed += 1;
        }
        self.observer.on_finish();

        let output_path = writer.close()?;
        let file_size = std::fs::metadata(&output_path).map(|m| m.len()).unwrap_or(0);
        let summary = ExportSummary {
            users_processed,
            rows_written,
            elapsed: start.elapsed(),
            output_path,
            file_size,
        };

        metrics.record_success(summary.users_processed, summary.rows_written);
        info!(
            "Export completed successfully in {:.1} minutes: {} ({} users, {} rows)",
            summary.elapsed_minutes(),
            summary.output_path.display(),
            summary.users_processed,
            summary.rows_written
        );
        Ok(summary)
    }

    fn check_cancelled(&self) -> ExportResult<()> {
        if self.directory.executor().is_cancelled() {
            warn!("Export cancelled");
            return Err(ExportError::Cancelled);
        }
        Ok(())
    }
}
