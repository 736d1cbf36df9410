//! Raw pull request payloads as returned by `/repos/{owner}/{repo}/pulls`.
//!
//! Only the fields needed for compliance analysis are modeled; everything else
//! in the payload is ignored.

use super::record::PullRequestState;
use serde::Deserialize;

/// A pull request as listed by the GitHub API.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPullRequest {
    /// Pull request number within its repository.
    pub number: u64,

    /// Title, used for progress logging only.
    #[serde(default)]
    pub title: Option<String>,

    /// Lifecycle state.
    pub state: PullRequestState,

    /// Merge time, absent or null when not merged.
    #[serde(default)]
    pub merged_at: Option<String>,

    /// Source branch.
    pub head: RawBranch,
}

/// Branch reference of a pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBranch {
    /// Repository holding the branch; null when the fork was deleted.
    #[serde(default)]
    pub repo: Option<RawRepository>,
}

/// Repository object embedded in a branch reference.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRepository {
    /// GitHub repository ID.
    pub id: u64,

    /// Repository name.
    pub name: String,

    /// `owner/name`.
    pub full_name: String,

    /// Owning account.
    pub owner: RawOwner,
}

/// Owner account embedded in a repository object.
#[derive(Debug, Clone, Deserialize)]
pub struct RawOwner {
    /// Account login.
    pub login: String,
}
