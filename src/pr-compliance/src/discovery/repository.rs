//! Repository information.

use serde::{Deserialize, Serialize};

/// A repository listed for an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// GitHub repository ID.
    pub id: u64,

    /// Repository name, unique within the organization.
    pub name: String,

    /// Repository owner.
    pub owner: RepositoryOwner,
}

/// Owner account of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryOwner {
    /// Account login.
    pub login: String,
}
