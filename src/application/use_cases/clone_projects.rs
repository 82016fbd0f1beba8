use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::application::services::result_aggregator::{ResultAggregator, TaskPanicked};
use crate::domain::entities::Project;
use crate::domain::value_objects::Credential;
use crate::infrastructure::git::{CloneError, CloneRequest, RepositoryCloner, WorkingCopy};
use crate::infrastructure::gitlab::DEFAULT_GITLAB_URL;

/// 同時に実行するクローン数のデフォルト値
pub const DEFAULT_MAX_CONCURRENT_CLONES: usize = 10;

/// クローン先ルートディレクトリのデフォルト値
pub const DEFAULT_CLONE_ROOT: &str = "/tmp/gctl/";

/// CloneProjects関連のエラー（一括クローン開始前に検出されるもの）
#[derive(Debug, Error)]
pub enum CloneProjectsError {
    #[error("Concurrency limit must be at least 1, got {0}")]
    InvalidConcurrency(usize),

    #[error("Destination root must not be empty")]
    EmptyDestination,
}

impl From<TaskPanicked> for CloneError {
    fn from(panic: TaskPanicked) -> Self {
        CloneError::TaskFailed(panic.message)
    }
}

/// 一括クローンの設定
#[derive(Debug, Clone)]
pub struct CloneProjectsConfig {
    /// クローン先のルート（各プロジェクトはネームスペースパスの位置に置かれる）
    pub destination: PathBuf,

    /// 同時に実行中のクローン数の上限
    pub max_concurrent: usize,

    pub recurse_submodules: bool,

    /// クローンURLのホスト部分（例: `https://gitlab.com`）
    pub clone_base_url: String,
}

impl Default for CloneProjectsConfig {
    fn default() -> Self {
        Self {
            destination: PathBuf::from(DEFAULT_CLONE_ROOT),
            max_concurrent: DEFAULT_MAX_CONCURRENT_CLONES,
            recurse_submodules: true,
            clone_base_url: DEFAULT_GITLAB_URL.to_string(),
        }
    }
}

impl CloneProjectsConfig {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
            ..Self::default()
        }
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn with_recurse_submodules(mut self, recurse_submodules: bool) -> Self {
        self.recurse_submodules = recurse_submodules;
        self
    }

    pub fn with_clone_base_url(mut self, clone_base_url: impl Into<String>) -> Self {
        self.clone_base_url = clone_base_url.into();
        self
    }

    pub fn validate(&self) -> Result<(), CloneProjectsError> {
        if self.max_concurrent == 0 {
            return Err(CloneProjectsError::InvalidConcurrency(self.max_concurrent));
        }
        if self.destination.as_os_str().is_empty() {
            return Err(CloneProjectsError::EmptyDestination);
        }
        Ok(())
    }
}

/// 1プロジェクト分のクローン結果
#[derive(Debug)]
pub struct CloneOutcome {
    pub project: Project,
    pub destination: PathBuf,
    pub result: Result<WorkingCopy, CloneError>,
}

impl CloneOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// 一括クローンの結果（入力プロジェクトごとに1件、入力順）
#[derive(Debug, Default)]
pub struct CloneReport {
    pub outcomes: Vec<CloneOutcome>,
}

impl CloneReport {
    pub fn successful_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.successful_count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&CloneOutcome, &CloneError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o, e)))
    }

    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }
}

/// プロジェクト一括クローンのユースケース
///
/// 同時実行数は `max_concurrent` で制限される
pub struct CloneProjectsUseCase {
    config: CloneProjectsConfig,
    cloner: Arc<dyn RepositoryCloner>,
    cancel: CancellationToken,
}

impl CloneProjectsUseCase {
    pub fn new(config: CloneProjectsConfig, cloner: Arc<dyn RepositoryCloner>) -> Self {
        Self {
            config,
            cloner,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &CloneProjectsConfig {
        &self.config
    }

    /// 全プロジェクトをクローンし、全ての完了を待つ
    ///
    /// 個々の失敗で全体は中断せず、[`CloneReport`] に記録される
    pub async fn execute(
        &self,
        projects: Vec<Project>,
        credential: &Credential,
    ) -> Result<CloneReport, CloneProjectsError> {
        self.config.validate()?;

        info!(
            projects = projects.len(),
            max_concurrent = self.config.max_concurrent,
            destination = %self.config.destination.display(),
            "Starting bulk clone"
        );

        let gate = Arc::new(Semaphore::new(self.config.max_concurrent));
        let mut workers = ResultAggregator::new();

        for (index, project) in projects.into_iter().enumerate() {
            let destination = project.destination_in(&self.config.destination);
            let request = CloneRequest::new(
                project.clone_url(&self.config.clone_base_url),
                destination.clone(),
            )
            .with_recurse_submodules(self.config.recurse_submodules);

            let worker = clone_worker(
                Arc::clone(&self.cloner),
                Arc::clone(&gate),
                request,
                credential.clone(),
                self.cancel.clone(),
            );
            workers.spawn((index, project, destination), worker);
        }

        let joined = workers.finish().await;

        let mut indexed: Vec<(usize, CloneOutcome)> = joined
            .successes
            .into_iter()
            .map(|(key, copy)| (key, Ok::<_, CloneError>(copy)))
            .chain(joined.failures.into_iter().map(|(key, e)| (key, Err(e))))
            .map(|((index, project, destination), result)| {
                (
                    index,
                    CloneOutcome {
                        project,
                        destination,
                        result,
                    },
                )
            })
            .collect();
        indexed.sort_by_key(|(index, _)| *index);

        let report = CloneReport {
            outcomes: indexed.into_iter().map(|(_, outcome)| outcome).collect(),
        };

        info!(
            succeeded = report.successful_count(),
            failed = report.failed_count(),
            "Bulk clone finished"
        );
        Ok(report)
    }
}

async fn clone_worker(
    cloner: Arc<dyn RepositoryCloner>,
    gate: Arc<Semaphore>,
    request: CloneRequest,
    credential: Credential,
    cancel: CancellationToken,
) -> Result<WorkingCopy, CloneError> {
    // ワーカー終了まで保持（どの経路で戻っても解放される）
    let _permit = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(CloneError::Cancelled),
        permit = gate.acquire_owned() => permit
            .map_err(|_| CloneError::TaskFailed("admission gate closed".to_string()))?,
    };

    info!("Cloning: {}", request.destination.display());

    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CloneError::Cancelled),
        result = cloner.clone_repository(&request, &credential, &cancel) => result,
    };

    if let Err(e) = &result {
        warn!("Failed to clone {}: {}", request.destination.display(), e);
    }
    result
}
