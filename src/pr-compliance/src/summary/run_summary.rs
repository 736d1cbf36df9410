//! Crawl summary types.

use super::result::ProcessingResult;

/// Summary of a complete crawl.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Organization that was crawled.
    pub organization: String,

    /// Whether the repository listing finished without error.
    pub listing_complete: bool,

    /// Number of repositories discovered.
    pub repositories_discovered: usize,

    /// Number of repositories crawled completely.
    pub repositories_crawled: usize,

    /// Number of repositories whose pull request fetch stopped early.
    pub repositories_failed: usize,

    /// Number of pull requests received.
    pub pull_requests_collected: usize,

    /// Number of records written.
    pub records_saved: usize,

    /// Number of pull requests that could not be normalized or written.
    pub records_failed: usize,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            listing_complete: true,
            ..Default::default()
        }
    }

    /// Updates the summary with a processing result.
    pub fn record_result(&mut self, result: &ProcessingResult) {
        match result {
            ProcessingResult::Success {
                collected,
                saved,
                rejected,
                ..
            } => {
                self.repositories_crawled += 1;
                self.pull_requests_collected += collected;
                self.records_saved += saved;
                self.records_failed += rejected;
            }
            ProcessingResult::Failed {
                collected,
                saved,
                rejected,
                ..
            } => {
                self.repositories_failed += 1;
                self.pull_requests_collected += collected;
                self.records_saved += saved;
                self.records_failed += rejected;
            }
        }
    }

    /// Returns true if any failures occurred.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.listing_complete || self.repositories_failed > 0 || self.records_failed > 0
    }

    /// Returns true if all operations were successful.
    #[must_use]
    pub fn all_success(&self) -> bool {
        !self.has_failures()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_record_result() {
        let mut summary = RunSummary::new("acme");

        summary.record_result(&ProcessingResult::Success {
            repository: "widgets".to_string(),
            collected: 3,
            saved: 3,
            rejected: 0,
        });

        assert_eq!(summary.repositories_crawled, 1);
        assert_eq!(summary.records_saved, 3);
        assert!(summary.all_success());
    }

    #[test]
    fn failed_repository_counts_partial_work() {
        let mut summary = RunSummary::new("acme");

        summary.record_result(&ProcessingResult::Failed {
            repository: "gadgets".to_string(),
            collected: 2,
            saved: 1,
            rejected: 1,
            error: "Unexpected HTTP 500".to_string(),
        });

        assert_eq!(summary.repositories_failed, 1);
        assert_eq!(summary.records_saved, 1);
        assert_eq!(summary.records_failed, 1);
        assert!(summary.has_failures());
    }

    #[test]
    fn incomplete_listing_is_a_failure() {
        let mut summary = RunSummary::new("acme");
        summary.listing_complete = false;

        assert!(summary.has_failures());
    }
}
