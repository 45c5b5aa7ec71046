//! Error types for CSV ingestion.

use std::fmt;
use std::path::PathBuf;

use reqview_model::ModelError;
use thiserror::Error;

/// Errors that can occur while ingesting a procurement export.
#[derive(Debug, Error)]
pub enum IngestError {
    // === Pipeline Errors ===
    /// The CSV text is empty or whitespace-only.
    #[error("CSV input is empty")]
    EmptyInput,

    /// Filtering and projection left no rows.
    #[error("no rows matched: {reason}")]
    NoMatchingRows { reason: NoMatchReason },

    // === File System Errors ===
    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the maximum accepted size.
    #[error("CSV file {path} is {size} bytes, larger than the {max_size} byte limit")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// File starts with a byte order mark for an encoding we do not read.
    #[error("CSV file {path} is {encoding}; only UTF-8 is supported")]
    UnsupportedEncoding {
        path: PathBuf,
        encoding: &'static str,
    },

    /// File content is not valid UTF-8.
    #[error("CSV file {path} is not valid UTF-8")]
    InvalidUtf8 { path: PathBuf },

    // === Export Errors ===
    /// Failed to create or write an output file.
    #[error("failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a report as CSV.
    #[error("failed to write CSV {path}: {source}")]
    CsvWrite {
        path: PathBuf,
        #[source]
        source: ::csv::Error,
    },

    /// The assembled report violated a model invariant.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl IngestError {
    /// Why no rows matched, if this is a [`IngestError::NoMatchingRows`].
    pub fn no_match_reason(&self) -> Option<&NoMatchReason> {
        match self {
            Self::NoMatchingRows { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Cause of an empty filter result.
///
/// A missing status column usually means the export format changed its
/// header names, which is a different problem from a period with no stalled
/// requisitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoMatchReason {
    /// The status header could not be resolved; every row was dropped.
    StatusColumnMissing { column: String },
    /// The status column exists but no row carried an allowed value.
    NoStatusMatch { scanned: usize },
}

impl fmt::Display for NoMatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StatusColumnMissing { column } => {
                write!(f, "status column '{column}' not found in CSV header")
            }
            Self::NoStatusMatch { scanned } => {
                write!(f, "none of {scanned} data rows has an allowed status")
            }
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
