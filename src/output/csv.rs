//! CSV table writer
//!
//! One row per (user, organization) pair, or a single row with empty
//! organization columns for users outside every organization. Metadata is
//! flattened into `user_metadata.<key>` / `app_metadata.<key>` columns that
//! follow the fixed columns in order of first appearance.

use csv::Writer;
use serde_json::Value;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{OutputError, OutputResult};
use crate::{CompositeRecord, Role};

const DEFAULT_BUFFER_SIZE: usize = 8192; // 8KB buffer

/// Fixed leading columns, in output order.
pub const BASE_COLUMNS: [&str; 18] = [
    "User ID",
    "Email",
    "Name",
    "Nickname",
    "Email Verified",
    "Blocked",
    "Organization ID",
    "Organization Name",
    "Organization Display Name",
    "Global Roles",
    "Organization Roles",
    "Created At",
    "Updated At",
    "Last Login",
    "Login Count",
    "Connection",
    "Provider",
    "Picture",
];

const COL_ORG_ID: usize = 6;
const COL_ORG_NAME: usize = 7;
const COL_ORG_DISPLAY_NAME: usize = 8;
const COL_ORG_ROLES: usize = 10;

/// One flattened output row.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Cells for [`BASE_COLUMNS`], same order
    pub base: Vec<String>,
    /// Metadata cells as (column, value), in the user's key order
    pub metadata: Vec<(String, String)>,
}

impl TableRow {
    /// Cell by column name.
    pub fn get(&self, column: &str) -> Option<&str> {
        if let Some(idx) = BASE_COLUMNS.iter().position(|c| *c == column) {
            return self.base.get(idx).map(String::as_str);
        }
        self.metadata
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

/// Render a JSON value as a cell: strings raw, null empty, others as JSON text.
pub fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn join_role_names(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|r| r.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Flatten one composite record into table rows.
pub fn flatten_record(record: &CompositeRecord) -> Vec<TableRow> {
    let user = &record.user;
    let identity = user.first_identity();
    let identity_field = |key: &str| cell(identity.and_then(|i| i.get(key)));
    let flag = |key: &str| match user.field(key) {
        None | Some(Value::Null) => "false".to_string(),
        value => cell(value),
    };

    let base = vec![
        user.user_id.clone(),
        user.email.clone().unwrap_or_default(),
        cell(user.field("name")),
        cell(user.field("nickname")),
        flag("email_verified"),
        flag("blocked"),
        String::new(),
        String::new(),
        String::new(),
        join_role_names(&record.global_roles),
        String::new(),
        cell(user.field("created_at")),
        cell(user.field("updated_at")),
        cell(user.field("last_login")),
        match user.field("logins_count") {
            None | Some(Value::Null) => "0".to_string(),
            value => cell(value),
        },
        identity_field("connection"),
        identity_field("provider"),
        cell(user.field("picture")),
    ];

    let mut metadata = Vec::new();
    for prefix in ["user_metadata", "app_metadata"] {
        if let Some(Value::Object(map)) = user.field(prefix) {
            for (key, value) in map {
                metadata.push((format!("{prefix}.{key}"), cell(Some(value))));
            }
        }
    }

    let template = TableRow { base, metadata };
    if record.organizations.is_empty() {
        return vec![template];
    }

    record
        .organizations
        .iter()
        .map(|membership| {
            let mut row = template.clone();
            let org = &membership.organization;
            row.base[COL_ORG_ID] = org.id.clone();
            row.base[COL_ORG_NAME] = org.name.clone();
            row.base[COL_ORG_DISPLAY_NAME] = org.display_name.clone().unwrap_or_default();
            row.base[COL_ORG_ROLES] = join_role_names(&membership.roles);
            row
        })
        .collect()
}

/// CSV writer for flattened export records.
///
/// Rows are held until [`CsvTableWriter::close`] because the header depends
/// on every metadata key seen during the run.
pub struct CsvTableWriter {
    path: PathBuf,
    rows: Vec<TableRow>,
    metadata_columns: Vec<String>,
    seen_columns: HashSet<String>,
    buffer_size: usize,
}

impl CsvTableWriter {
    /// Create a new CSV table writer.
    ///
    /// The parent directory is created immediately so path problems surface
    /// before any API traffic.
    pub fn new<P: AsRef<Path>>(path: P) -> OutputResult<Self> {
        Self::new_with_buffer_size(path, DEFAULT_BUFFER_SIZE)
    }

    /// Create a new CSV table writer with custom buffer size
    pub fn new_with_buffer_size<P: AsRef<Path>>(
        path: P,
        buffer_size: usize,
    ) -> OutputResult<Self> {
        let path = path.as_ref();
        info!("Creating CSV writer: path={}", path.display());
        super::ensure_parent_dir(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            rows: Vec::new(),
            metadata_columns: Vec::new(),
            seen_columns: HashSet::new(),
            buffer_size,
        })
    }

    /// Flatten and queue one record. Returns the number of rows it produced.
    pub fn write_record(&mut self, record: &CompositeRecord) -> OutputResult<usize> {
        let rows = flatten_record(record);
        let count = rows.len();
        for row in rows {
            for (column, _) in &row.metadata {
                if self.seen_columns.insert(column.clone()) {
                    self.metadata_columns.push(column.clone());
                }
            }
            self.rows.push(row);
        }
        Ok(count)
    }

    /// Rows queued so far.
    pub fn rows_written(&self) -> usize {
        self.rows.len()
    }

    /// Header in output order.
    pub fn header(&self) -> Vec<&str> {
        BASE_COLUMNS
            .iter()
            .copied()
            .chain(self.metadata_columns.iter().map(String::as_str))
            .collect()
    }

    /// Write the file and sync it to disk. Returns its path.
    pub fn close(self) -> OutputResult<PathBuf> {
        debug!("Closing CSV writer: {} rows", self.rows.len());

        let file = File::create(&self.path)
            .map_err(|e| OutputError::IoError(format!("Failed to create file: {}", e)))?;
        let mut writer = Writer::from_writer(BufWriter::with_capacity(self.buffer_size, file));

        writer
            .write_record(self.header())
            .map_err(|e| OutputError::CsvError(format!("Failed to write header: {}", e)))?;

        for row in &self.rows {
            let metadata = self.metadata_columns.iter().map(|column| {
                row.metadata
                    .iter()
                    .find(|(name, _)| name == column)
                    .map(|(_, value)| value.as_str())
                    .unwrap_or("")
            });
            let cells: Vec<&str> = row.base.iter().map(String::as_str).chain(metadata).collect();
            writer
                .write_record(&cells)
                .map_err(|e| OutputError::CsvError(format!("Failed to write row: {}", e)))?;
        }

        writer
            .flush()
            .map_err(|e| OutputError::FlushError(format!("Failed to flush: {}", e)))?;

        let buf_writer = writer.into_inner().map_err(|e| {
            OutputError::IoError(format!("Failed to get inner writer: {}", e))
        })?;
        let file = buf_writer.into_inner().map_err(|e| {
            OutputError::IoError(format!("Failed to get file handle: {}", e))
        })?;
        file.sync_all()
            .map_err(|e| OutputError::IoError(format!("Failed to sync file: {}", e)))?;

        info!(
            "CSV writer closed successfully: {} rows written to {}",
            self.rows.len(),
            self.path.display()
        );
        Ok(self.path)
    }
}
