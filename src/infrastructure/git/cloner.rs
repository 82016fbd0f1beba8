use async_trait::async_trait;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use crate::domain::value_objects::Credential;

/// Common interface for materializing a remote repository on disk
#[async_trait]
pub trait RepositoryCloner: Send + Sync {
    /// Clone `request.url` into `request.destination`.
    ///
    /// Implementations must not touch an existing working copy: a destination
    /// that already holds content fails with
    /// [`CloneError::DestinationConflict`].
    async fn clone_repository(
        &self,
        request: &CloneRequest,
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> Result<WorkingCopy, CloneError>;
}

/// What to clone and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneRequest {
    pub url: String,
    pub destination: PathBuf,
    /// Initialize and update submodules, recursively
    pub recurse_submodules: bool,
}

impl CloneRequest {
    pub fn new(url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            destination: destination.into(),
            recurse_submodules: true,
        }
    }

    pub fn with_recurse_submodules(mut self, recurse_submodules: bool) -> Self {
        self.recurse_submodules = recurse_submodules;
        self
    }
}

/// Handle to a freshly created local working copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingCopy {
    pub path: PathBuf,
    /// Checked out commit, `None` for an empty repository
    pub head: Option<String>,
}

/// Errors that can occur while cloning a single repository
#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    #[error("Destination already exists and is not empty: {}", path.display())]
    DestinationConflict { path: PathBuf },

    #[error("Git clone of {url} failed: {source}")]
    Git {
        url: String,
        #[source]
        source: git2::Error,
    },

    #[error("Submodule '{name}' update failed: {source}")]
    Submodule {
        name: String,
        #[source]
        source: git2::Error,
    },

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Clone cancelled")]
    Cancelled,

    #[error("Clone task failed: {0}")]
    TaskFailed(String),
}

impl CloneError {
    pub fn is_destination_conflict(&self) -> bool {
        matches!(self, Self::DestinationConflict { .. })
    }
}
