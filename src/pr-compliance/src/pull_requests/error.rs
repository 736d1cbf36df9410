//! Pull request normalization error types.

use thiserror::Error;

/// Errors that keep a raw pull request from becoming a record.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The payload does not have the expected shape.
    #[error("Malformed pull request payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The head repository is gone (e.g. a deleted fork).
    #[error("Pull request #{number} has no head repository")]
    MissingHeadRepository { number: u64 },

    /// `head.repo.full_name` has no `owner/` prefix.
    #[error("Pull request #{number} has an invalid repository full name '{full_name}'")]
    InvalidFullName { number: u64, full_name: String },

    /// `merged_at` is present but not an RFC 3339 timestamp.
    #[error("Invalid timestamp '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}
