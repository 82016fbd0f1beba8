use futures::future::try_join_all;
use std::sync::Arc;
use tracing::info;

use crate::domain::entities::{Job, Pipeline, Project};
use crate::infrastructure::gitlab::{RemoteError, RemoteGateway};

/// パイプラインとそのジョブ一覧
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub pipeline: Pipeline,
    pub jobs: Vec<Job>,
}

/// プロジェクトの最近のパイプライン
#[derive(Debug, Clone)]
pub struct PipelineOverview {
    pub project: Project,
    pub runs: Vec<PipelineRun>,
}

/// コマンドラインから要求されたジョブ操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAction {
    Trace(u64),
    Play(u64),
    Retry(u64),
    Cancel(u64),
}

/// What a [`JobAction`] produced
#[derive(Debug, Clone)]
pub enum JobActionOutput {
    Trace(String),
    Updated(Job),
}

/// パイプライン状態の取得とジョブ操作のユースケース
pub struct PipelineOverviewUseCase {
    gateway: Arc<dyn RemoteGateway>,
}

impl PipelineOverviewUseCase {
    pub fn new(gateway: Arc<dyn RemoteGateway>) -> Self {
        Self { gateway }
    }

    /// `namespace_path` のプロジェクトを解決し、パイプラインとジョブを取得
    pub async fn overview(&self, namespace_path: &str) -> Result<PipelineOverview, RemoteError> {
        let project = self.gateway.get_project(namespace_path).await?;
        let pipelines = self.gateway.list_pipelines(project.id).await?;

        let runs = try_join_all(pipelines.into_iter().map(|pipeline| {
            let gateway = Arc::clone(&self.gateway);
            let project_id = project.id;
            async move {
                let jobs = gateway.list_pipeline_jobs(project_id, pipeline.id).await?;
                Ok::<_, RemoteError>(PipelineRun { pipeline, jobs })
            }
        }))
        .await?;

        info!(project = %project.namespace_path, pipelines = runs.len(), "Loaded pipelines");
        Ok(PipelineOverview { project, runs })
    }

    /// Apply `action` to a job of the project at `namespace_path`.
    pub async fn run_action(
        &self,
        namespace_path: &str,
        action: JobAction,
    ) -> Result<JobActionOutput, RemoteError> {
        let project = self.gateway.get_project(namespace_path).await?;
        let output = match action {
            JobAction::Trace(job) => {
                JobActionOutput::Trace(self.gateway.job_trace(project.id, job).await?)
            }
            JobAction::Play(job) => {
                info!(project = %project.namespace_path, job, "Playing job");
                JobActionOutput::Updated(self.gateway.play_job(project.id, job).await?)
            }
            JobAction::Retry(job) => {
                info!(project = %project.namespace_path, job, "Retrying job");
                JobActionOutput::Updated(self.gateway.retry_job(project.id, job).await?)
            }
            JobAction::Cancel(job) => {
                info!(project = %project.namespace_path, job, "Cancelling job");
                JobActionOutput::Updated(self.gateway.cancel_job(project.id, job).await?)
            }
        };
        Ok(output)
    }
}
