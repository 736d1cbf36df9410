//! Pull request collection and normalization.
//!
//! [`collect_pull_requests`] pulls every pull request of one repository, in
//! all states. [`normalize`] reduces each raw payload to a
//! [`PullRequestRecord`].

mod error;
mod raw;
mod record;

pub use error::NormalizeError;
pub use raw::{RawBranch, RawOwner, RawPullRequest, RawRepository};
pub use record::{
    format_timestamp, parse_timestamp, PullRequestRecord, PullRequestState,
    RECORD_TIMESTAMP_FORMAT,
};

use crate::github::{endpoint, FetchError, PaginatedFetcher};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, info_span, warn, Instrument};

/// Raw pull requests collected for one repository.
///
/// When collection stopped early, `pull_requests` holds what was received
/// before the failure and `failure` says why.
#[derive(Debug, Default)]
pub struct PullRequestBatch {
    /// Raw payloads in API order.
    pub pull_requests: Vec<Value>,

    /// Why collection stopped early, if it did.
    pub failure: Option<FetchError>,
}

impl PullRequestBatch {
    /// Returns true if every page was collected.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Collects every pull request (open, closed and merged) of a repository.
///
/// Never fails outright: partial results are returned together with the
/// failure that cut collection short.
pub async fn collect_pull_requests(
    fetcher: &PaginatedFetcher,
    organization: &str,
    repository: &str,
) -> PullRequestBatch {
    let span = info_span!("collect_pull_requests", organization = %organization, repo = %repository);

    async {
        debug!("Collecting pull requests");

        let url = match endpoint(
            fetcher.api_base(),
            &["repos", organization, repository, "pulls"],
        ) {
            Ok(url) => url,
            Err(e) => {
                return PullRequestBatch {
                    pull_requests: Vec::new(),
                    failure: Some(e),
                }
            }
        };

        let per_page = fetcher.per_page().to_string();
        let pages = fetcher
            .fetch(
                url,
                &[("state", "all"), ("per_page", per_page.as_str())],
                None,
            )
            .await;
        let (pull_requests, failure) = pages.into_items();

        for pr in &pull_requests {
            let number = pr.get("number").and_then(Value::as_u64).unwrap_or_default();
            let title = pr.get("title").and_then(Value::as_str).unwrap_or_default();
            let state = pr.get("state").and_then(Value::as_str).unwrap_or("unknown");
            debug!("PR #{number}: {title} (State: {state})");
        }

        match &failure {
            None => info!(count = pull_requests.len(), "Collected pull requests"),
            Some(e) => warn!(
                count = pull_requests.len(),
                error = %e,
                "Collection incomplete, keeping pull requests found so far"
            ),
        }

        PullRequestBatch {
            pull_requests,
            failure,
        }
    }
    .instrument(span)
    .await
}

/// Reduces a raw pull request payload to a [`PullRequestRecord`].
///
/// # Errors
///
/// Returns [`NormalizeError`] if the payload is malformed, has no head
/// repository, or carries an unparseable `merged_at`.
pub fn normalize(raw: &Value) -> Result<PullRequestRecord, NormalizeError> {
    let raw = RawPullRequest::deserialize(raw)?;
    PullRequestRecord::from_raw(&raw)
}
