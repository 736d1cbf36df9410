//! Record storage error types.

use thiserror::Error;

/// Errors that can occur while reading or writing record files.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("I/O error at '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be serialized or parsed.
    #[error("Invalid record JSON at '{path}': {source}")]
    JsonError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Aggregation input is empty.
    #[error("No record files found under '{path}'")]
    NoRecords { path: String },
}
