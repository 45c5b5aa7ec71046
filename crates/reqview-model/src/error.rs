//! Error types for model construction and normalization.

use thiserror::Error;

/// Errors raised while building or normalizing model values.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A data row does not have one field per header.
    #[error("row {row} has {found} fields, expected {expected}")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Report names must contain at least one non-whitespace character.
    #[error("report name cannot be empty")]
    EmptyReportName,

    /// Identifier text could not be parsed.
    #[error("invalid identifier '{0}'")]
    InvalidId(String),

    /// A persisted record could not be normalized into the canonical shape.
    #[error("invalid stored record: {0}")]
    InvalidRecord(String),
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
