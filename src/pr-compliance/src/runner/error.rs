//! Runner error types.

use crate::github::FetchError;

/// Errors that abort a crawl or aggregation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Settings loading errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// GitHub client initialization errors.
    #[error(transparent)]
    Client(#[from] FetchError),

    /// Listing failed before any repository was found.
    #[error("Failed to list repositories of '{organization}': {source}")]
    RepositoryListing {
        organization: String,
        #[source]
        source: FetchError,
    },

    /// Record loading errors, including an empty input.
    #[error(transparent)]
    Storage(#[from] crate::storage::StorageError),

    /// Output writing errors.
    #[error(transparent)]
    Aggregate(#[from] crate::aggregate::AggregateError),
}
