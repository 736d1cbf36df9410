//! Durable per-pull-request record files.
//!
//! Layout under the data directory:
//!
//! ```text
//! data/
//! ├── {organization}_{repository}_prs/
//! │   ├── pr_1.json
//! │   └── pr_2.json
//! ```
//!
//! Each file holds one [`PullRequestRecord`]. Writing the same key again
//! replaces the file.

mod error;

pub use error::StorageError;

use crate::pull_requests::PullRequestRecord;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Reads and writes record files below a root directory.
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    /// Creates a store rooted at `root`. Nothing is touched on disk yet.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory holding one repository's records.
    #[must_use]
    pub fn repository_dir(&self, organization: &str, repository: &str) -> PathBuf {
        self.root.join(format!("{organization}_{repository}_prs"))
    }

    /// Returns the file path for one pull request.
    #[must_use]
    pub fn record_path(&self, organization: &str, repository: &str, pr_number: u64) -> PathBuf {
        self.repository_dir(organization, repository)
            .join(format!("pr_{pr_number}.json"))
    }

    /// Writes `record` under (organization, repository, pr_number), replacing
    /// any earlier file at that key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the directory cannot be created, the record
    /// cannot be serialized, or the file cannot be written.
    pub fn persist(
        &self,
        record: &PullRequestRecord,
        organization: &str,
        repository: &str,
        pr_number: u64,
    ) -> Result<PathBuf, StorageError> {
        let dir = self.repository_dir(organization, repository);
        std::fs::create_dir_all(&dir).map_err(|e| StorageError::IoError {
            path: dir.display().to_string(),
            source: e,
        })?;

        let path = self.record_path(organization, repository, pr_number);
        let json = serde_json::to_vec(record).map_err(|e| StorageError::JsonError {
            path: path.display().to_string(),
            source: e,
        })?;

        std::fs::write(&path, json).map_err(|e| StorageError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        debug!(pr_number, path = %path.display(), "Saved record");
        Ok(path)
    }

    /// Loads every `*.json` record below the root.
    ///
    /// Files that fail to parse are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NoRecords`] if no record could be loaded, or
    /// [`StorageError::IoError`] if the root cannot be walked.
    pub fn load_all(&self) -> Result<Vec<PullRequestRecord>, StorageError> {
        info!(path = %self.root.display(), "Loading records");

        if !self.root.is_dir() {
            return Err(StorageError::NoRecords {
                path: self.root.display().to_string(),
            });
        }

        let mut files = Vec::new();
        collect_json_files(&self.root, &mut files)?;
        files.sort();

        let mut records = Vec::with_capacity(files.len());
        for file in &files {
            match read_record(file) {
                Ok(record) => records.push(record),
                Err(e) => warn!(error = %e, "Skipping unreadable record"),
            }
        }

        if records.is_empty() {
            return Err(StorageError::NoRecords {
                path: self.root.display().to_string(),
            });
        }

        info!(files = files.len(), records = records.len(), "Loaded records");
        Ok(records)
    }
}

/// Recursively collects `*.json` files. Symlinked directories are not entered.
fn collect_json_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), StorageError> {
    let entries = std::fs::read_dir(dir).map_err(|e| StorageError::IoError {
        path: dir.display().to_string(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| StorageError::IoError {
            path: dir.display().to_string(),
            source: e,
        })?;
        let file_type = entry.file_type().map_err(|e| StorageError::IoError {
            path: entry.path().display().to_string(),
            source: e,
        })?;
        let path = entry.path();

        if file_type.is_dir() {
            collect_json_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }

    Ok(())
}

fn read_record(path: &Path) -> Result<PullRequestRecord, StorageError> {
    let content = std::fs::read(path).map_err(|e| StorageError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::from_slice(&content).map_err(|e| StorageError::JsonError {
        path: path.display().to_string(),
        source: e,
    })
}
