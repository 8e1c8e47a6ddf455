//! Lookups, aggregation, mutations, and export orchestration

pub mod aggregator;
pub mod directory;
pub mod driver;
pub mod mutation;
pub mod progress;

pub use aggregator::RecordAggregator;
pub use directory::{Directory, UserLookup};
pub use driver::{ExportDriver, ExportSummary};
pub use mutation::{
    parse_target_list, read_target_file, BulkOutcome, BulkReport, MutationAction, RoleManager,
};
pub use progress::{LoggingObserver, NoopObserver, ProgressObserver};

use crate::output::OutputError;

/// Export errors
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Writing the output failed
    #[error(transparent)]
    Output(#[from] OutputError),

    /// Shutdown was requested mid-export
    #[error("export cancelled")]
    Cancelled,
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;
