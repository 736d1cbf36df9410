//! Per-repository compliance aggregation.
//!
//! Groups [`PullRequestRecord`]s by (organization, repository ID, repository
//! name, owner) and computes one [`ComplianceSummary`] per group.
//! [`write_summaries`] stores the result as a Parquet file.

mod error;
mod output;
mod summary;

pub use error::AggregateError;
pub use output::{write_summaries, WriteOutcome};
pub use summary::{ComplianceSummary, RepositoryKey};

use crate::pull_requests::PullRequestRecord;
use std::collections::BTreeMap;

/// Aggregates records into one summary per repository, ordered by key.
///
/// A repository is compliant when every pull request is merged and its owner
/// contains `owner_marker`, compared case-insensitively. Repositories without
/// records do not appear.
#[must_use]
pub fn aggregate(records: &[PullRequestRecord], owner_marker: &str) -> Vec<ComplianceSummary> {
    let mut groups: BTreeMap<RepositoryKey, ComplianceSummary> = BTreeMap::new();

    for record in records {
        let key = RepositoryKey {
            organization_name: record.organization_name.clone(),
            repository_id: record.repository_id,
            repository_name: record.repository_name.clone(),
            repository_owner: record.repository_owner.clone(),
        };
        let summary = groups
            .entry(key)
            .or_insert_with_key(|key| ComplianceSummary::empty(key.clone()));

        summary.num_prs += 1;
        if record.merged {
            summary.num_prs_merged += 1;
            if let Some(merged_at) = record.merged_at {
                summary.merged_at = summary.merged_at.max(Some(merged_at));
            }
        }
    }

    let marker = owner_marker.to_lowercase();
    groups
        .into_values()
        .map(|mut summary| {
            summary.is_compliant = summary.num_prs == summary.num_prs_merged
                && summary.repository_owner.to_lowercase().contains(&marker);
            summary
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pull_requests::{parse_timestamp, PullRequestState};

    fn record(
        repository_id: u64,
        repository_name: &str,
        owner: &str,
        merged_at: Option<&str>,
    ) -> PullRequestRecord {
        let merged_at = parse_timestamp(merged_at).unwrap();
        PullRequestRecord {
            organization_name: "Scytale-exercise".to_string(),
            repository_id,
            repository_name: repository_name.to_string(),
            repository_owner: owner.to_string(),
            state: if merged_at.is_some() {
                PullRequestState::Closed
            } else {
                PullRequestState::Open
            },
            merged: merged_at.is_some(),
            merged_at,
            pull_request_number: None,
        }
    }

    #[test]
    fn mixed_repository_is_not_compliant() {
        let records = vec![
            record(1, "A", "Scytale-exercise", Some("2023-05-01T12:00:00Z")),
            record(1, "A", "Scytale-exercise", None),
        ];

        let summaries = aggregate(&records, "scytale");

        assert_eq!(summaries.len(), 1);
        let a = &summaries[0];
        assert_eq!(a.num_prs, 2);
        assert_eq!(a.num_prs_merged, 1);
        assert_eq!(a.merged_at, parse_timestamp(Some("2023-05-01T12:00:00Z")).unwrap());
        assert!(!a.is_compliant);
        assert!((a.merge_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn fully_merged_trusted_owner_is_compliant() {
        let records = vec![
            record(2, "B", "Scytale-exercise", Some("2023-05-01T12:00:00Z")),
            record(2, "B", "Scytale-exercise", Some("2023-06-01T08:30:00Z")),
        ];

        let summaries = aggregate(&records, "scytale");

        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].is_compliant);
        assert_eq!(
            summaries[0].merged_at,
            parse_timestamp(Some("2023-06-01T08:30:00Z")).unwrap()
        );
    }

    #[test]
    fn untrusted_owner_is_not_compliant() {
        let records = vec![record(3, "C", "someone-else", Some("2023-05-01T12:00:00Z"))];

        let summaries = aggregate(&records, "scytale");

        assert_eq!(summaries[0].num_prs, summaries[0].num_prs_merged);
        assert!(!summaries[0].is_compliant);
    }

    #[test]
    fn unmerged_group_has_null_merge_time() {
        let records = vec![record(4, "D", "Scytale", None), record(4, "D", "Scytale", None)];

        let summaries = aggregate(&records, "scytale");

        assert_eq!(summaries[0].num_prs_merged, 0);
        assert!(summaries[0].merged_at.is_none());
        assert!(!summaries[0].is_compliant);
    }

    #[test]
    fn groups_by_full_key_in_order() {
        let records = vec![
            record(9, "zeta", "acme", None),
            record(1, "alpha", "acme", None),
            record(9, "zeta", "acme", None),
        ];

        let summaries = aggregate(&records, "acme");
        let ids: Vec<(u64, u64)> = summaries.iter().map(|s| (s.repository_id, s.num_prs)).collect();

        assert_eq!(ids, vec![(1, 1), (9, 2)]);
    }

    #[test]
    fn repositories_without_records_are_absent() {
        assert!(aggregate(&[], "scytale").is_empty());
    }
}
