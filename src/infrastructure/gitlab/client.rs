use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::gateway::{RemoteError, RemoteGateway};
use super::pagination::{collect_pages, PageInfo, DEFAULT_PER_PAGE};
use crate::domain::entities::{Group, Job, Pipeline, Project};
use crate::domain::value_objects::Credential;

/// Default host used when no `--gitlab-url` is configured
pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";

/// Connection settings for [`GitLabClient`]
#[derive(Debug, Clone)]
pub struct GitLabConfig {
    /// Web root of the instance, e.g. `https://gitlab.com`
    pub base_url: String,

    /// Records requested per page
    pub per_page: u32,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GITLAB_URL.to_string(),
            per_page: DEFAULT_PER_PAGE,
            timeout_seconds: 30,
        }
    }
}

impl GitLabConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// GitLab REST API v4 implementation of [`RemoteGateway`]
pub struct GitLabClient {
    http: reqwest::Client,
    api_root: Url,
    credential: Credential,
    per_page: u32,
}

impl GitLabClient {
    pub fn new(config: GitLabConfig, credential: Credential) -> Result<Self, RemoteError> {
        let api_root = Self::api_root(&config.base_url)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("gctl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_root,
            credential,
            per_page: config.per_page.max(1),
        })
    }

    fn api_root(base_url: &str) -> Result<Url, RemoteError> {
        let root = format!("{}/api/v4/", base_url.trim_end_matches('/'));
        let url = Url::parse(&root)
            .map_err(|e| RemoteError::invalid_base_url(base_url, e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(RemoteError::invalid_base_url(
                base_url,
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(url)
    }

    /// Build an API URL; every segment is percent-encoded on its own, so
    /// `org/team` is sent as `org%2Fteam`.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.api_root.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::invalid_base_url(self.api_root.as_str(), "cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, method: Method, url: Url) -> Result<Response, RemoteError> {
        debug!(%method, %url, "GitLab request");
        let response = self
            .http
            .request(method, url.clone())
            .bearer_auth(self.credential.expose())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RemoteError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, RemoteError> {
        let response = self.send(Method::GET, url).await?;
        Ok(response.json::<T>().await?)
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
        page: u32,
    ) -> Result<(Vec<T>, PageInfo), RemoteError> {
        let mut url = self.endpoint(segments)?;
        url.query_pairs_mut()
            .extend_pairs(query)
            .append_pair("per_page", &self.per_page.to_string())
            .append_pair("page", &page.to_string());

        let response = self.send(Method::GET, url).await?;
        let info = PageInfo::from_headers(response.headers());
        let batch = response.json::<Vec<T>>().await?;
        Ok((batch, info))
    }

    async fn fetch_all<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, RemoteError> {
        collect_pages(move |page| self.fetch_page(segments, query, page)).await
    }

    async fn job_action(
        &self,
        project_id: u64,
        job_id: u64,
        action: &str,
    ) -> Result<Job, RemoteError> {
        let project = project_id.to_string();
        let job = job_id.to_string();
        let url = self.endpoint(&["projects", &project, "jobs", &job, action])?;
        let response = self.send(Method::POST, url).await?;
        Ok(response.json::<Job>().await?)
    }
}

#[async_trait]
impl RemoteGateway for GitLabClient {
    async fn list_group_projects(&self, group_path: &str) -> Result<Vec<Project>, RemoteError> {
        let projects: Vec<Project> = self
            .fetch_all(&["groups", group_path, "projects"], &[("membership", "true")])
            .await?;
        debug!(group = group_path, count = projects.len(), "Listed group projects");
        Ok(projects)
    }

    async fn list_subgroups(&self, group_path: &str) -> Result<Vec<Group>, RemoteError> {
        let groups: Vec<Group> = self
            .fetch_all(&["groups", group_path, "subgroups"], &[])
            .await?;
        debug!(group = group_path, count = groups.len(), "Listed subgroups");
        Ok(groups)
    }

    async fn get_project(&self, namespace_path: &str) -> Result<Project, RemoteError> {
        let url = self.endpoint(&["projects", namespace_path])?;
        self.get_json(url).await
    }

    async fn list_pipelines(&self, project_id: u64) -> Result<Vec<Pipeline>, RemoteError> {
        let project = project_id.to_string();
        let url = self.endpoint(&["projects", &project, "pipelines"])?;
        let summaries: Vec<Pipeline> = self.get_json(url).await?;

        // The list payload lacks duration and timestamps; fetch each in full.
        try_join_all(summaries.iter().map(|summary| {
            let pipeline = summary.id.to_string();
            let url = self.endpoint(&["projects", &project, "pipelines", &pipeline]);
            async move { self.get_json::<Pipeline>(url?).await }
        }))
        .await
    }

    async fn list_pipeline_jobs(
        &self,
        project_id: u64,
        pipeline_id: u64,
    ) -> Result<Vec<Job>, RemoteError> {
        let project = project_id.to_string();
        let pipeline = pipeline_id.to_string();
        let url = self.endpoint(&["projects", &project, "pipelines", &pipeline, "jobs"])?;
        self.get_json(url).await
    }

    async fn job_trace(&self, project_id: u64, job_id: u64) -> Result<String, RemoteError> {
        let project = project_id.to_string();
        let job = job_id.to_string();
        let url = self.endpoint(&["projects", &project, "jobs", &job, "trace"])?;
        let response = self.send(Method::GET, url).await?;
        Ok(response.text().await?)
    }

    async fn play_job(&self, project_id: u64, job_id: u64) -> Result<Job, RemoteError> {
        self.job_action(project_id, job_id, "play").await
    }

    async fn retry_job(&self, project_id: u64, job_id: u64) -> Result<Job, RemoteError> {
        self.job_action(project_id, job_id, "retry").await
    }

    async fn cancel_job(&self, project_id: u64, job_id: u64) -> Result<Job, RemoteError> {
        self.job_action(project_id, job_id, "cancel").await
    }
}
