//! Error types for store I/O operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing store documents
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to acquire the sidecar lock after multiple retries.
    ///
    /// Expected under concurrent access; callers log this below error
    /// severity rather than treating it as a defect.
    #[error("Lock on {path} still contended after {retries} retries")]
    LockContended { path: PathBuf, retries: u32 },

    /// File I/O error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a JSON document
    #[error("JSON parse error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize a document for writing
    #[error("JSON serialize error for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Target path has no parent directory or no filename component
    #[error("Invalid store path: {path}")]
    InvalidPath { path: PathBuf },
}

impl StoreError {
    /// Whether this error is worth retrying after a short delay.
    ///
    /// Lock contention and the transient I/O classes are retryable; parse
    /// failures, serialization failures and bad paths are not.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::LockContended { .. } => true,
            StoreError::Io { source, .. } => crate::retry::is_transient_io(source),
            _ => false,
        }
    }

    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
