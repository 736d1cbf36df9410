//! Per-repository compliance rows.

use chrono::NaiveDateTime;
use serde::Serialize;

/// Grouping key of a [`ComplianceSummary`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RepositoryKey {
    /// Organization name.
    pub organization_name: String,
    /// Repository ID.
    pub repository_id: u64,
    /// Repository name.
    pub repository_name: String,
    /// Repository owner login.
    pub repository_owner: String,
}

/// Compliance metrics for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceSummary {
    /// Organization name.
    pub organization_name: String,

    /// Repository ID.
    pub repository_id: u64,

    /// Repository name.
    pub repository_name: String,

    /// Repository owner login.
    pub repository_owner: String,

    /// Number of pull requests.
    pub num_prs: u64,

    /// Number of merged pull requests.
    pub num_prs_merged: u64,

    /// Latest merge time among merged pull requests.
    pub merged_at: Option<NaiveDateTime>,

    /// All pull requests merged and the owner carries the trust marker.
    pub is_compliant: bool,
}

impl ComplianceSummary {
    pub(crate) fn empty(key: RepositoryKey) -> Self {
        Self {
            organization_name: key.organization_name,
            repository_id: key.repository_id,
            repository_name: key.repository_name,
            repository_owner: key.repository_owner,
            num_prs: 0,
            num_prs_merged: 0,
            merged_at: None,
            is_compliant: false,
        }
    }

    /// Share of merged pull requests, `0.0` for an empty group.
    #[must_use]
    pub fn merge_rate(&self) -> f64 {
        if self.num_prs == 0 {
            return 0.0;
        }
        self.num_prs_merged as f64 / self.num_prs as f64
    }
}
