/// Infrastructure layer modules
///
/// This layer provides concrete implementations for external system interactions:
/// - GitLab REST API access (groups, projects, pipelines, jobs)
/// - Git operations (clone with credentials and submodules)
pub mod git;
pub mod gitlab;

// Re-export commonly used types
pub use git::{CloneError, CloneRequest, Git2Cloner, RepositoryCloner, WorkingCopy};
pub use gitlab::{GitLabClient, GitLabConfig, RemoteError, RemoteGateway};
