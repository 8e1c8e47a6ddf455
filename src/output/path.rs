//! Default output file names
//!
//! - full export: `auth0_users_export_YYYYMMDD_HHMMSS.{csv,json}`
//! - single user: `auth0_user_{sanitized id}_YYYYMMDD_HHMMSS.json`

use chrono::{DateTime, Local, TimeZone};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Flattened table
    #[default]
    Csv,
    /// Nested documents
    Json,
}

impl ExportFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unsupported export format '{other}' (expected csv or json)")),
        }
    }
}

fn stamp<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    now.format("%Y%m%d_%H%M%S").to_string()
}

/// Replace characters that are awkward in file names (`|`, `@`) with `_`.
pub fn sanitize_user_id(user_id: &str) -> String {
    user_id.replace(['|', '@'], "_")
}

/// Default path for a full export, stamped with local time.
pub fn default_export_path(format: ExportFormat) -> PathBuf {
    export_path_at(format, &Local::now())
}

/// Full export path for a given instant.
pub fn export_path_at<Tz: TimeZone>(format: ExportFormat, now: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: fmt::Display,
{
    PathBuf::from(format!(
        "auth0_users_export_{}.{}",
        stamp(now),
        format.extension()
    ))
}

/// Default path for a single-user JSON export.
pub fn default_single_user_path(user_id: &str) -> PathBuf {
    single_user_path_at(user_id, &Local::now())
}

/// Single-user path for a given instant.
pub fn single_user_path_at<Tz: TimeZone>(user_id: &str, now: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: fmt::Display,
{
    PathBuf::from(format!(
        "auth0_user_{}_{}.json",
        sanitize_user_id(user_id),
        stamp(now)
    ))
}
