//! Aggregation error types.

use thiserror::Error;

/// Errors that can occur while writing the aggregation output.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The destination exists and the policy is `fail`.
    #[error("Output already exists at '{path}'")]
    OutputExists { path: String },

    /// Filesystem failure.
    #[error("I/O error at '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Parquet encoding failure.
    #[error("Failed to write parquet output '{path}': {source}")]
    ParquetError {
        path: String,
        #[source]
        source: parquet::errors::ParquetError,
    },
}
