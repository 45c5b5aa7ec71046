//! Persistence error types.
//!
//! Every store operation returns a structured error. Apart from
//! [`PersistenceError::NotFound`] and [`PersistenceError::InvalidPatch`],
//! which describe the request itself, all variants are storage I/O failures
//! that callers surface unmodified and recover from by re-reading the store.

use std::path::PathBuf;

use thiserror::Error;

/// Persistence operation error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// An update targeted an id that is not stored.
    #[error("No record with id {id}")]
    NotFound { id: i64 },

    /// A patch carried nothing to apply or an unusable value.
    #[error("Invalid update: {reason}")]
    InvalidPatch { reason: String },

    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete save operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Failed to serialize stored data")]
    Serialization {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Deserialization error.
    #[error("Failed to deserialize stored data")]
    Deserialization {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A stored record could not be normalized.
    #[error("Invalid stored record: {reason}")]
    InvalidRecord { reason: String },

    /// The local storage area has no room for the new value.
    #[error("Storage quota exceeded: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded { needed: usize, limit: usize },

    /// Transport-level failure talking to the remote store.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The remote store answered with a non-success status.
    #[error("Remote store returned {status}: {body}")]
    Remote { status: u16, body: String },

    /// Backend settings cannot be used.
    #[error("Invalid store configuration: {reason}")]
    InvalidConfig { reason: String },

    /// A blocking I/O task panicked or was cancelled.
    #[error("Background storage task failed")]
    TaskJoin {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl PersistenceError {
    /// Whether this is a storage I/O failure rather than a rejected request.
    pub fn is_store_io(&self) -> bool {
        !matches!(
            self,
            Self::NotFound { .. } | Self::InvalidPatch { .. } | Self::InvalidConfig { .. }
        )
    }

    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { id } => format!("Report {id} does not exist."),
            Self::InvalidPatch { reason } => format!("The update was rejected: {reason}."),
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} the file at {}", operation, path.display())
            }
            Self::AtomicWriteFailed { target_path, .. } => {
                format!(
                    "Could not save the file to {}. Please check disk space and permissions.",
                    target_path.display()
                )
            }
            Self::Serialization { .. } => "An error occurred while saving the data.".to_string(),
            Self::Deserialization { .. } | Self::InvalidRecord { .. } => {
                "An error occurred while reading stored data. The store may be corrupted."
                    .to_string()
            }
            Self::QuotaExceeded { .. } => "Local storage is full.".to_string(),
            Self::Network { .. } => "Could not reach the remote store.".to_string(),
            Self::Remote { status, .. } => {
                format!("The remote store rejected the request (HTTP {status}).")
            }
            Self::InvalidConfig { reason } => format!("The store is misconfigured: {reason}."),
            Self::TaskJoin { .. } => "A storage task was interrupted.".to_string(),
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::NotFound { .. } => Some("List reports to see the current ids.".into()),
            Self::InvalidPatch { .. } => Some("Provide a non-empty report name.".into()),
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to this location.".into())
                }
            }
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or try saving to a different location.".into())
            }
            Self::Deserialization { .. } | Self::InvalidRecord { .. } => {
                Some("Try restoring the store from a backup.".into())
            }
            Self::QuotaExceeded { .. } => {
                Some("Delete old reports or switch to the file backend.".into())
            }
            Self::Network { .. } => {
                Some("Check your connection and the remote URL, then list reports again.".into())
            }
            Self::Remote { status, .. } if *status == 401 || *status == 403 => {
                Some("Check the remote API key.".into())
            }
            Self::Remote { .. } => Some("List reports again to resynchronize.".into()),
            Self::InvalidConfig { .. } => Some("Fix the remote settings in the config file.".into()),
            Self::Serialization { .. } | Self::TaskJoin { .. } => None,
        }
    }
}

impl From<reqwest::Error> for PersistenceError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
