//! GitLab REST API access.
pub mod client;
pub mod gateway;
pub mod pagination;

pub use client::{GitLabClient, GitLabConfig, DEFAULT_GITLAB_URL};
pub use gateway::{RemoteError, RemoteGateway};
pub use pagination::{PageInfo, DEFAULT_PER_PAGE};
