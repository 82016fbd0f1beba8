pub mod clone;
pub mod completion;
pub mod pipeline;
pub mod tree;

pub use clone::*;
pub use completion::*;
pub use pipeline::*;
pub use tree::*;

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::common::{GctlError, GctlResult, OptionExt};
use crate::domain::value_objects::Credential;
use crate::infrastructure::gitlab::{GitLabClient, GitLabConfig, RemoteGateway};

/// Settings shared by every command that talks to the GitLab instance
pub struct CommandContext {
    pub gitlab_url: String,
    access_token: Option<String>,
    pub cancel: CancellationToken,
}

impl CommandContext {
    pub fn new(
        gitlab_url: impl Into<String>,
        access_token: Option<String>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            gitlab_url: gitlab_url.into(),
            access_token,
            cancel,
        }
    }

    /// The access token, required for every remote operation
    pub fn credential(&self) -> GctlResult<Credential> {
        let token = self
            .access_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or_config_error(
                "GitLab access token is required (--gitlab-access-token or GITLAB_ACCESS_TOKEN)",
            )?;
        Credential::new(token)
    }

    /// API client authenticated with `credential`
    pub fn gateway(&self, credential: &Credential) -> GctlResult<Arc<dyn RemoteGateway>> {
        let client = GitLabClient::new(GitLabConfig::new(&self.gitlab_url), credential.clone())?;
        Ok(Arc::new(client))
    }
}

/// Reject an empty group path before any request is made
pub(crate) fn require_group(group: &str) -> GctlResult<String> {
    let trimmed = group.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(GctlError::validation_error(
            "group",
            "group path must not be empty",
            Some(group.to_string()),
        ));
    }
    Ok(trimmed.to_string())
}
