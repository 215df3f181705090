//! JSON output formatter for duplicate scan results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "sets": [
//!     {
//!       "hash": "abc123...",
//!       "size": 1024,
//!       "files": [
//!         { "path": "/path/to/file1.txt", "modified": "2024-01-01T00:00:00Z" }
//!       ]
//!     }
//!   ],
//!   "summary": {
//!     "files_examined": 100,
//!     "duplicate_files": 10,
//!     "duplicate_sets": 5,
//!     "space_occupied": 51200,
//!     "scan_duration_ms": 1234,
//!     "exit_code": 0,
//!     "exit_code_name": "RM000"
//!   }
//! }
//! ```

use std::io::Write;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::duplicates::{DuplicateSet, DuplicateSetRegistry, ScanSummary};
use crate::error::ExitCode;
use crate::scanner::FileRecord;

/// One member of a set.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFile {
    /// Path as scanned
    pub path: String,
    /// Creation time, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// Last access time, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessed: Option<DateTime<Utc>>,
    /// Last modification time, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

impl JsonFile {
    fn from_record(record: &FileRecord) -> Self {
        let utc = |t: Option<SystemTime>| t.map(DateTime::<Utc>::from);
        Self {
            path: record.path.to_string_lossy().into_owned(),
            created: utc(record.created),
            accessed: utc(record.accessed),
            modified: utc(record.modified),
        }
    }
}

/// A single duplicate set in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSet {
    /// BLAKE3 hash as hexadecimal string (64 characters)
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// Members in sort order
    pub files: Vec<JsonFile>,
}

impl JsonSet {
    /// Convert a duplicate set.
    #[must_use]
    pub fn from_set(set: &DuplicateSet) -> Self {
        Self {
            hash: set.hash_hex(),
            size: set.size(),
            files: set.members().iter().map(JsonFile::from_record).collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Files that passed the filter
    pub files_examined: u64,
    /// Files belonging to a duplicate set
    pub duplicate_files: u64,
    /// Number of duplicate sets
    pub duplicate_sets: u64,
    /// Reclaimable bytes
    pub space_occupied: u64,
    /// Files whose content was hashed
    pub files_hashed: u64,
    /// Per-entry scan errors
    pub errors: u64,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "RM000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            files_examined: summary.files_examined,
            duplicate_files: summary.duplicate_files,
            duplicate_sets: summary.duplicate_sets,
            space_occupied: summary.space_occupied,
            files_hashed: summary.files_hashed,
            errors: summary.errors,
            scan_duration_ms: summary.duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    /// Duplicate sets, in listing order
    pub sets: Vec<JsonSet>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonReport {
    /// Build a report.
    ///
    /// # Arguments
    ///
    /// * `registry` - The scan result
    /// * `summary` - The scan summary statistics
    /// * `exit_code` - The exit code for this run
    /// * `reverse` - List sets back to front
    #[must_use]
    pub fn new(
        registry: &DuplicateSetRegistry,
        summary: &ScanSummary,
        exit_code: ExitCode,
        reverse: bool,
    ) -> Self {
        let mut sets: Vec<JsonSet> = registry.iter().map(JsonSet::from_set).collect();
        if reverse {
            sets.reverse();
        }
        Self {
            sets,
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
