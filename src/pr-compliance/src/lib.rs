#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod aggregate;
pub mod config;
pub mod discovery;
pub mod github;
pub mod pull_requests;
pub mod rate_limit;
pub mod runner;
pub mod storage;
pub mod summary;

pub use aggregate::{aggregate, write_summaries, AggregateError, ComplianceSummary, WriteOutcome};
pub use config::{ConfigError, OutputPolicy, Settings};
pub use discovery::{list_repositories, Repository, RepositoryListing};
pub use github::{install_crypto_provider, FetchError, PaginatedFetcher, Pages};
pub use pull_requests::{
    collect_pull_requests, format_timestamp, normalize, NormalizeError, PullRequestBatch,
    PullRequestRecord, PullRequestState,
};
pub use rate_limit::{RateLimitInfo, RateLimiter, RetryDecision};
pub use runner::{AggregateReport, Runner, RunnerError};
pub use storage::{RecordStore, StorageError};
pub use summary::{ProcessingResult, RunSummary};
