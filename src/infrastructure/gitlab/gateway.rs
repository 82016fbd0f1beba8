use async_trait::async_trait;

use crate::domain::entities::{Group, Job, Pipeline, Project};

/// Common interface to the hosting service's group/project API
///
/// Every method performs at most one logical listing and returns a fully
/// materialized result: paginated collections are either returned whole or
/// not at all.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Projects owned directly by `group_path` that the caller is a member of
    async fn list_group_projects(&self, group_path: &str) -> Result<Vec<Project>, RemoteError>;

    /// Immediate subgroups of `group_path`
    async fn list_subgroups(&self, group_path: &str) -> Result<Vec<Group>, RemoteError>;

    /// Resolve a single project by its namespace path
    async fn get_project(&self, namespace_path: &str) -> Result<Project, RemoteError>;

    /// Most recent pipelines of a project, with full details
    async fn list_pipelines(&self, project_id: u64) -> Result<Vec<Pipeline>, RemoteError>;

    /// Jobs belonging to one pipeline
    async fn list_pipeline_jobs(
        &self,
        project_id: u64,
        pipeline_id: u64,
    ) -> Result<Vec<Job>, RemoteError>;

    /// Raw log output of a job
    async fn job_trace(&self, project_id: u64, job_id: u64) -> Result<String, RemoteError>;

    /// Trigger a manual job
    async fn play_job(&self, project_id: u64, job_id: u64) -> Result<Job, RemoteError>;

    /// Retry a finished job
    async fn retry_job(&self, project_id: u64, job_id: u64) -> Result<Job, RemoteError>;

    /// Cancel a running job
    async fn cancel_job(&self, project_id: u64, job_id: u64) -> Result<Job, RemoteError>;
}

/// Errors that can occur while talking to the hosting service
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Request to {url} failed with status {status}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    #[error("HTTP request failed: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("Invalid GitLab URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl RemoteError {
    /// Create an invalid base URL error
    pub fn invalid_base_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBaseUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// HTTP status code, when the remote answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http { source } => source.status().map(|s| s.as_u16()),
            Self::InvalidBaseUrl { .. } => None,
        }
    }

    /// Whether the remote reported the resource as missing or hidden
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
