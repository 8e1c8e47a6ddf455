//! Export writers

use std::path::{Path, PathBuf};

use crate::CompositeRecord;

pub mod csv;
pub mod json;
pub mod path;

pub use self::csv::{flatten_record, CsvTableWriter, TableRow, BASE_COLUMNS};
pub use self::json::{read_records, write_single_record, JsonDocumentWriter};
pub use self::path::ExportFormat;

/// Output writer errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// CSV write error
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Buffer flush error
    #[error("flush error: {0}")]
    FlushError(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Format-dispatched export writer.
pub enum ExportWriter {
    /// CSV table
    Table(CsvTableWriter),
    /// JSON array document
    Document(JsonDocumentWriter),
}

impl ExportWriter {
    /// Writer for `format` at `path`.
    pub fn create<P: AsRef<Path>>(format: ExportFormat, path: P) -> OutputResult<Self> {
        match format {
            ExportFormat::Csv => Ok(Self::Table(CsvTableWriter::new(path)?)),
            ExportFormat::Json => Ok(Self::Document(JsonDocumentWriter::new(path)?)),
        }
    }

    /// Write one record; returns the number of rows/entries it produced.
    ///
    /// Takes the record by value so the JSON document can keep it without a copy.
    pub fn write_record(&mut self, record: CompositeRecord) -> OutputResult<usize> {
        match self {
            Self::Table(w) => w.write_record(&record),
            Self::Document(w) => w.write_record(record),
        }
    }

    /// Finalize the file and return its path.
    pub fn close(self) -> OutputResult<PathBuf> {
        match self {
            Self::Table(w) => w.close(),
            Self::Document(w) => w.close(),
        }
    }
}

fn ensure_parent_dir(path: &Path) -> OutputResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| OutputError::IoError(format!("Failed to create directory: {}", e)))?;
        }
    }
    Ok(())
}
