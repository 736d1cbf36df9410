//! Per-repository crawl results.

/// Result of crawling a single repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingResult {
    /// Every page was fetched.
    Success {
        /// Repository name.
        repository: String,
        /// Pull requests received.
        collected: usize,
        /// Records written.
        saved: usize,
        /// Pull requests that could not be normalized or written.
        rejected: usize,
    },

    /// Fetching stopped early; whatever was received was still saved.
    Failed {
        /// Repository name.
        repository: String,
        /// Pull requests received before the failure.
        collected: usize,
        /// Records written.
        saved: usize,
        /// Pull requests that could not be normalized or written.
        rejected: usize,
        /// Why fetching stopped.
        error: String,
    },
}

impl ProcessingResult {
    /// Returns the repository name.
    #[must_use]
    pub fn repository(&self) -> &str {
        match self {
            Self::Success { repository, .. } | Self::Failed { repository, .. } => repository,
        }
    }
}
