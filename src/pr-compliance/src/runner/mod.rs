//! Orchestrates the crawl and aggregation phases.
//!
//! The phases are separate runs: [`Runner::crawl`] writes one record file per
//! pull request, [`Runner::aggregate`] later reads them all back.

mod error;

pub use error::RunnerError;

use crate::aggregate::{aggregate, write_summaries, ComplianceSummary, WriteOutcome};
use crate::config::Settings;
use crate::discovery::{list_repositories, RepositoryListing};
use crate::github::PaginatedFetcher;
use crate::pull_requests::{collect_pull_requests, normalize};
use crate::storage::RecordStore;
use crate::summary::{ProcessingResult, RunSummary};
use serde_json::Value;
use tracing::{error, info, info_span, warn, Instrument};

/// Outcome of an aggregation run.
#[derive(Debug, Clone)]
pub struct AggregateReport {
    /// Number of records read.
    pub records_loaded: usize,

    /// One row per repository.
    pub summaries: Vec<ComplianceSummary>,

    /// What happened to the output file.
    pub outcome: WriteOutcome,
}

/// Runs the crawl and aggregation phases with a fixed set of settings.
///
/// The HTTP client is only built when a crawl starts, so aggregation works
/// offline.
pub struct Runner {
    settings: Settings,
    store: RecordStore,
}

impl Runner {
    /// Builds a runner from the provided settings.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        let store = RecordStore::new(settings.data_dir.clone());
        Self { settings, store }
    }

    /// Returns the settings this runner was built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Crawls every repository of `organization` and saves one record per
    /// pull request.
    ///
    /// Repositories are processed one at a time. A failure inside one
    /// repository is recorded in the summary and the crawl moves on.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Client`] if the HTTP client cannot be built and
    /// [`RunnerError::RepositoryListing`] if listing failed before any
    /// repository was found.
    pub async fn crawl(&self, organization: &str) -> Result<RunSummary, RunnerError> {
        let span = info_span!("crawl", organization = %organization);

        async {
            let fetcher = PaginatedFetcher::from_settings(&self.settings)?;
            let mut summary = RunSummary::new(organization);
            let RepositoryListing {
                repositories,
                failure,
            } = list_repositories(&fetcher, organization).await;

            if let Some(source) = failure {
                if repositories.is_empty() {
                    return Err(RunnerError::RepositoryListing {
                        organization: organization.to_string(),
                        source,
                    });
                }
                error!(error = %source, "Repository listing incomplete, crawling what was found");
                summary.listing_complete = false;
            }

            summary.repositories_discovered = repositories.len();
            if repositories.is_empty() {
                warn!("Organization has no repositories");
                return Ok(summary);
            }

            info!(count = repositories.len(), "Found repositories");

            for repository in &repositories {
                let result = self
                    .process_repository(&fetcher, organization, &repository.name)
                    .await;
                summary.record_result(&result);
            }

            Ok(summary)
        }
        .instrument(span)
        .await
    }

    async fn process_repository(
        &self,
        fetcher: &PaginatedFetcher,
        organization: &str,
        repository: &str,
    ) -> ProcessingResult {
        info!(repo = %repository, "Processing repository");

        let batch = collect_pull_requests(fetcher, organization, repository).await;
        let collected = batch.pull_requests.len();
        let (saved, rejected) = self.save_pull_requests(organization, repository, &batch.pull_requests);

        match batch.failure {
            None => ProcessingResult::Success {
                repository: repository.to_string(),
                collected,
                saved,
                rejected,
            },
            Some(e) => {
                error!(repo = %repository, error = %e, "Failed to collect pull requests");
                ProcessingResult::Failed {
                    repository: repository.to_string(),
                    collected,
                    saved,
                    rejected,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Normalizes and writes each pull request; returns (saved, rejected).
    fn save_pull_requests(
        &self,
        organization: &str,
        repository: &str,
        pull_requests: &[Value],
    ) -> (usize, usize) {
        let mut saved = 0;
        let mut rejected = 0;

        for raw in pull_requests {
            let record = match normalize(raw) {
                Ok(record) => record,
                Err(e) => {
                    warn!(repo = %repository, error = %e, "Skipping pull request");
                    rejected += 1;
                    continue;
                }
            };

            let Some(number) = record.pull_request_number else {
                warn!(repo = %repository, "Skipping pull request without a number");
                rejected += 1;
                continue;
            };

            match self.store.persist(&record, organization, repository, number) {
                Ok(_) => saved += 1,
                Err(e) => {
                    error!(repo = %repository, pr_number = number, error = %e, "Failed to save record");
                    rejected += 1;
                }
            }
        }

        (saved, rejected)
    }

    /// Aggregates every saved record and writes the compliance summary.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Storage`] when no records are found and
    /// [`RunnerError::Aggregate`] when the output cannot be written or already
    /// exists under the `fail` policy.
    pub fn aggregate(&self) -> Result<AggregateReport, RunnerError> {
        let _span = info_span!("aggregate", data_dir = %self.store.root().display()).entered();

        let records = self.store.load_all()?;
        let summaries = aggregate(&records, &self.settings.compliance_owner_substring);
        info!(
            records = records.len(),
            repositories = summaries.len(),
            "Aggregated records"
        );

        let outcome = write_summaries(
            &self.settings.output_path(),
            &summaries,
            self.settings.on_output_exists,
        )?;

        Ok(AggregateReport {
            records_loaded: records.len(),
            summaries,
            outcome,
        })
    }
}
