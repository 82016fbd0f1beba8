//! In-memory group tree served through `RemoteGateway`

use async_trait::async_trait;
use gctl::domain::entities::{Group, Job, Pipeline, Project};
use gctl::infrastructure::gitlab::{RemoteError, RemoteGateway};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Serves a fixed group tree; groups marked failing answer with a 500
#[derive(Default)]
pub struct FakeGateway {
    projects: HashMap<String, Vec<Project>>,
    subgroups: HashMap<String, Vec<Group>>,
    failing_projects: HashSet<String>,
    failing_subgroups: HashSet<String>,
    latency: Option<Duration>,
    next_id: u64,
    pub calls: AtomicUsize,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `path` as a group owning the projects named in `projects`
    pub fn group(mut self, path: &str, projects: &[&str]) -> Self {
        let owned = projects
            .iter()
            .map(|name| {
                self.next_id += 1;
                Project::new(self.next_id, format!("{path}/{name}"))
            })
            .collect();
        self.projects.insert(path.to_string(), owned);
        self.subgroups.entry(path.to_string()).or_default();

        if let Some((parent, _)) = path.rsplit_once('/') {
            self.next_id += 1;
            let group = Group::new(self.next_id, path);
            self.subgroups.entry(parent.to_string()).or_default().push(group);
        }
        self
    }

    /// Add an explicit parent/child edge, even one that closes a cycle
    pub fn edge(mut self, parent: &str, child: &str) -> Self {
        self.next_id += 1;
        let group = Group::new(self.next_id, child);
        self.subgroups.entry(parent.to_string()).or_default().push(group);
        self
    }

    /// Add an already built project to `path`
    pub fn project(mut self, path: &str, project: Project) -> Self {
        self.projects.entry(path.to_string()).or_default().push(project);
        self
    }

    pub fn failing_projects(mut self, path: &str) -> Self {
        self.failing_projects.insert(path.to_string());
        self
    }

    pub fn failing_subgroups(mut self, path: &str) -> Self {
        self.failing_subgroups.insert(path.to_string());
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Every namespace path the tree contains, sorted
    pub fn all_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .projects
            .values()
            .flatten()
            .map(|p| p.namespace_path.clone())
            .collect();
        paths.sort();
        paths
    }

    async fn respond(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn server_error(path: &str, listing: &str) -> RemoteError {
    RemoteError::Status {
        url: format!("https://gitlab.test/api/v4/groups/{path}/{listing}"),
        status: 500,
        message: "500 Internal Server Error".to_string(),
    }
}

fn not_found(path: &str) -> RemoteError {
    RemoteError::Status {
        url: format!("https://gitlab.test/api/v4/{path}"),
        status: 404,
        message: "404 Not Found".to_string(),
    }
}

#[async_trait]
impl RemoteGateway for FakeGateway {
    async fn list_group_projects(&self, group_path: &str) -> Result<Vec<Project>, RemoteError> {
        self.respond().await;
        if self.failing_projects.contains(group_path) {
            return Err(server_error(group_path, "projects"));
        }
        self.projects
            .get(group_path)
            .cloned()
            .ok_or_else(|| not_found(group_path))
    }

    async fn list_subgroups(&self, group_path: &str) -> Result<Vec<Group>, RemoteError> {
        self.respond().await;
        if self.failing_subgroups.contains(group_path) {
            return Err(server_error(group_path, "subgroups"));
        }
        Ok(self.subgroups.get(group_path).cloned().unwrap_or_default())
    }

    async fn get_project(&self, namespace_path: &str) -> Result<Project, RemoteError> {
        self.respond().await;
        self.projects
            .values()
            .flatten()
            .find(|p| p.namespace_path == namespace_path)
            .cloned()
            .ok_or_else(|| not_found(namespace_path))
    }

    async fn list_pipelines(&self, project_id: u64) -> Result<Vec<Pipeline>, RemoteError> {
        Err(not_found(&format!("projects/{project_id}/pipelines")))
    }

    async fn list_pipeline_jobs(
        &self,
        project_id: u64,
        pipeline_id: u64,
    ) -> Result<Vec<Job>, RemoteError> {
        Err(not_found(&format!(
            "projects/{project_id}/pipelines/{pipeline_id}/jobs"
        )))
    }

    async fn job_trace(&self, project_id: u64, job_id: u64) -> Result<String, RemoteError> {
        Err(not_found(&format!("projects/{project_id}/jobs/{job_id}/trace")))
    }

    async fn play_job(&self, project_id: u64, job_id: u64) -> Result<Job, RemoteError> {
        Err(not_found(&format!("projects/{project_id}/jobs/{job_id}/play")))
    }

    async fn retry_job(&self, project_id: u64, job_id: u64) -> Result<Job, RemoteError> {
        Err(not_found(&format!("projects/{project_id}/jobs/{job_id}/retry")))
    }

    async fn cancel_job(&self, project_id: u64, job_id: u64) -> Result<Job, RemoteError> {
        Err(not_found(&format!("projects/{project_id}/jobs/{job_id}/cancel")))
    }
}
