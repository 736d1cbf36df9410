//! Normalized pull request records.

use super::error::NormalizeError;
use super::raw::RawPullRequest;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Layout of `merged_at` in records.
pub const RECORD_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Lifecycle state of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    /// Open.
    Open,
    /// Closed, merged or not.
    Closed,
}

impl PullRequestState {
    /// Returns the state as GitHub spells it.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// The persisted, compliance-relevant view of one pull request.
///
/// Serialized field names are a file-format contract shared with downstream
/// tooling, including the `"Organization Name"` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    /// Organization that owns the head repository.
    #[serde(rename = "Organization Name")]
    pub organization_name: String,

    /// Head repository ID.
    pub repository_id: u64,

    /// Head repository name.
    pub repository_name: String,

    /// Head repository owner login.
    pub repository_owner: String,

    /// Lifecycle state.
    pub state: PullRequestState,

    /// Merge time in UTC, second precision; `None` when not merged.
    #[serde(default, with = "record_timestamp")]
    pub merged_at: Option<NaiveDateTime>,

    /// Whether the pull request was merged.
    pub merged: bool,

    /// Pull request number. Absent in records written by older tooling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request_number: Option<u64>,
}

impl PullRequestRecord {
    /// Builds a record from a raw pull request.
    ///
    /// Identity fields come from the head repository, not the base one.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError`] if the head repository is missing, its full
    /// name has no owner prefix, or `merged_at` is not a timestamp.
    pub fn from_raw(raw: &RawPullRequest) -> Result<Self, NormalizeError> {
        let repo = raw
            .head
            .repo
            .as_ref()
            .ok_or(NormalizeError::MissingHeadRepository { number: raw.number })?;

        let organization_name = match repo.full_name.split_once('/') {
            Some((organization, _)) if !organization.is_empty() => organization.to_string(),
            _ => {
                return Err(NormalizeError::InvalidFullName {
                    number: raw.number,
                    full_name: repo.full_name.clone(),
                })
            }
        };

        let merged_at = parse_timestamp(raw.merged_at.as_deref())?;

        Ok(Self {
            organization_name,
            repository_id: repo.id,
            repository_name: repo.name.clone(),
            repository_owner: repo.owner.login.clone(),
            state: raw.state,
            merged: merged_at.is_some(),
            merged_at,
            pull_request_number: Some(raw.number),
        })
    }
}

/// Parses a GitHub RFC 3339 timestamp into UTC, truncated to whole seconds.
///
/// `None` and empty strings map to `None`.
///
/// # Errors
///
/// Returns [`NormalizeError::InvalidTimestamp`] for anything else that does
/// not parse.
pub fn parse_timestamp(raw: Option<&str>) -> Result<Option<NaiveDateTime>, NormalizeError> {
    let Some(value) = raw.filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    let parsed = DateTime::parse_from_rfc3339(value).map_err(|source| {
        NormalizeError::InvalidTimestamp {
            value: value.to_string(),
            source,
        }
    })?;

    let seconds = parsed.timestamp();
    Ok(DateTime::<Utc>::from_timestamp(seconds, 0).map(|utc| utc.naive_utc()))
}

/// Reformats a GitHub timestamp into the record layout `YYYY-MM-DD HH:MM:SS`.
///
/// # Errors
///
/// See [`parse_timestamp`].
pub fn format_timestamp(raw: Option<&str>) -> Result<Option<String>, NormalizeError> {
    Ok(parse_timestamp(raw)?.map(|ts| ts.format(RECORD_TIMESTAMP_FORMAT).to_string()))
}

mod record_timestamp {
    use super::RECORD_TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => {
                serializer.serialize_str(&ts.format(RECORD_TIMESTAMP_FORMAT).to_string())
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| NaiveDateTime::parse_from_str(&s, RECORD_TIMESTAMP_FORMAT))
            .transpose()
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(merged_at: serde_json::Value) -> RawPullRequest {
        serde_json::from_value(json!({
            "number": 12,
            "title": "Add feature",
            "state": "closed",
            "merged_at": merged_at,
            "head": {
                "repo": {
                    "id": 4242,
                    "name": "widgets",
                    "full_name": "Scytale-exercise/widgets",
                    "owner": { "login": "Scytale-exercise" }
                }
            },
            "base": {
                "repo": {
                    "id": 1,
                    "name": "upstream",
                    "full_name": "someone-else/upstream",
                    "owner": { "login": "someone-else" }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn formats_github_timestamp() {
        assert_eq!(
            format_timestamp(Some("2023-05-01T12:00:00Z")).unwrap(),
            Some("2023-05-01 12:00:00".to_string())
        );
    }

    #[test]
    fn null_timestamp_stays_null() {
        assert_eq!(format_timestamp(None).unwrap(), None);
    }

    #[test]
    fn offset_timestamp_is_converted_to_utc() {
        assert_eq!(
            format_timestamp(Some("2023-05-01T14:00:00.750+02:00")).unwrap(),
            Some("2023-05-01 12:00:00".to_string())
        );
    }

    #[test]
    fn rejects_garbage_timestamp() {
        assert!(matches!(
            format_timestamp(Some("yesterday")),
            Err(NormalizeError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn merged_pull_request_uses_head_repository() {
        let record = PullRequestRecord::from_raw(&raw(json!("2023-05-01T12:00:00Z"))).unwrap();

        assert_eq!(record.organization_name, "Scytale-exercise");
        assert_eq!(record.repository_id, 4242);
        assert_eq!(record.repository_name, "widgets");
        assert_eq!(record.repository_owner, "Scytale-exercise");
        assert_eq!(record.state, PullRequestState::Closed);
        assert!(record.merged);
        assert_eq!(
            record.merged_at.unwrap().format(RECORD_TIMESTAMP_FORMAT).to_string(),
            "2023-05-01 12:00:00"
        );
        assert_eq!(record.pull_request_number, Some(12));
    }

    #[test]
    fn unmerged_pull_request_has_no_merge_time() {
        let record = PullRequestRecord::from_raw(&raw(serde_json::Value::Null)).unwrap();

        assert!(!record.merged);
        assert!(record.merged_at.is_none());
    }

    #[test]
    fn missing_merged_at_key_is_unmerged() {
        let raw: RawPullRequest = serde_json::from_value(json!({
            "number": 3,
            "state": "open",
            "head": { "repo": {
                "id": 1, "name": "r", "full_name": "o/r", "owner": { "login": "o" }
            } }
        }))
        .unwrap();

        let record = PullRequestRecord::from_raw(&raw).unwrap();

        assert!(!record.merged);
        assert_eq!(record.state, PullRequestState::Open);
    }

    #[test]
    fn deleted_fork_is_rejected() {
        let raw: RawPullRequest = serde_json::from_value(json!({
            "number": 9,
            "state": "closed",
            "merged_at": null,
            "head": { "repo": null }
        }))
        .unwrap();

        assert!(matches!(
            PullRequestRecord::from_raw(&raw),
            Err(NormalizeError::MissingHeadRepository { number: 9 })
        ));
    }

    #[test]
    fn serializes_with_contract_keys() {
        let record = PullRequestRecord::from_raw(&raw(json!("2023-05-01T12:00:00Z"))).unwrap();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(
            value,
            json!({
                "Organization Name": "Scytale-exercise",
                "repository_id": 4242,
                "repository_name": "widgets",
                "repository_owner": "Scytale-exercise",
                "state": "closed",
                "merged_at": "2023-05-01 12:00:00",
                "merged": true,
                "pull_request_number": 12
            })
        );
    }

    #[test]
    fn reads_record_without_pull_request_number() {
        let record: PullRequestRecord = serde_json::from_value(json!({
            "Organization Name": "acme",
            "repository_id": 1,
            "repository_name": "r",
            "repository_owner": "acme",
            "state": "open",
            "merged_at": null,
            "merged": false
        }))
        .unwrap();

        assert_eq!(record.pull_request_number, None);
        assert!(record.merged_at.is_none());
    }
}
