//! JSON document writer
//!
//! Full exports are a pretty-printed array of composite records; a
//! single-user query writes one record as an object.

use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{OutputError, OutputResult};
use crate::CompositeRecord;

/// Collects records and writes them as one JSON array on close.
pub struct JsonDocumentWriter {
    path: PathBuf,
    records: Vec<CompositeRecord>,
}

impl JsonDocumentWriter {
    /// Create a writer targeting `path` (parent directories are created now).
    pub fn new<P: AsRef<Path>>(path: P) -> OutputResult<Self> {
        let path = path.as_ref();
        info!("Creating JSON writer: path={}", path.display());
        super::ensure_parent_dir(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            records: Vec::new(),
        })
    }

    /// Queue one record, taking ownership of it.
    pub fn write_record(&mut self, record: CompositeRecord) -> OutputResult<usize> {
        self.records.push(record);
        Ok(1)
    }

    /// Records queued so far.
    pub fn records_written(&self) -> usize {
        self.records.len()
    }

    /// Write the document and sync it to disk. Returns its path.
    pub fn close(self) -> OutputResult<PathBuf> {
        debug!("Closing JSON writer: {} records", self.records.len());
        write_pretty(&self.path, &self.records)?;
        info!(
            "JSON writer closed successfully: {} records written to {}",
            self.records.len(),
            self.path.display()
        );
        Ok(self.path)
    }
}

/// Write a single record as a JSON object.
pub fn write_single_record<P: AsRef<Path>>(path: P, record: &CompositeRecord) -> OutputResult<PathBuf> {
    let path = path.as_ref();
    super::ensure_parent_dir(path)?;
    write_pretty(path, record)?;
    info!("Single user JSON export completed: {}", path.display());
    Ok(path.to_path_buf())
}

/// Read back a full export.
pub fn read_records<P: AsRef<Path>>(path: P) -> OutputResult<Vec<CompositeRecord>> {
    let file = File::open(path.as_ref())
        .map_err(|e| OutputError::IoError(format!("Failed to open file: {}", e)))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| OutputError::SerializationError(e.to_string()))
}

fn write_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> OutputResult<()> {
    let file = File::create(path)
        .map_err(|e| OutputError::IoError(format!("Failed to create file: {}", e)))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| OutputError::SerializationError(e.to_string()))?;
    writer
        .write_all(b"\n")
        .map_err(|e| OutputError::IoError(e.to_string()))?;
    writer
        .flush()
        .map_err(|e| OutputError::FlushError(format!("Failed to flush: {}", e)))?;

    let file = writer
        .into_inner()
        .map_err(|e| OutputError::IoError(format!("Failed to get file handle: {}", e)))?;
    file.sync_all()
        .map_err(|e| OutputError::IoError(format!("Failed to sync file: {}", e)))
}
