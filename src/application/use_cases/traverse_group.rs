use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::services::result_aggregator::{ResultAggregator, TaskPanicked};
use crate::domain::entities::Project;
use crate::infrastructure::gitlab::{RemoteError, RemoteGateway};

/// グループツリー走査のエラー
#[derive(Debug, Error)]
pub enum TraverseGroupError {
    #[error("Failed to list projects of group '{group}': {source}")]
    ProjectListingFailed {
        group: String,
        #[source]
        source: RemoteError,
    },

    #[error("Failed to list subgroups of group '{group}': {source}")]
    SubgroupListingFailed {
        group: String,
        #[source]
        source: RemoteError,
    },

    #[error("Group '{group}' appears among its own ancestors")]
    CycleDetected { group: String },

    #[error("Group traversal cancelled")]
    Cancelled,

    #[error("Group traversal task panicked: {0}")]
    TaskPanicked(String),
}

impl From<TaskPanicked> for TraverseGroupError {
    fn from(panic: TaskPanicked) -> Self {
        Self::TaskPanicked(panic.message)
    }
}

/// 解決できなかったサブツリー
#[derive(Debug)]
pub struct GroupFailure {
    /// 走査に失敗したグループのフルパス
    pub group: String,
    pub error: TraverseGroupError,
}

/// 走査結果: 見つかったプロジェクトと失敗した全サブツリー
#[derive(Debug, Default)]
pub struct TraversalReport {
    /// 順序は不定。重複したメンバーシップ経由で同じプロジェクトが複数回現れることがある
    pub projects: Vec<Project>,
    pub failures: Vec<GroupFailure>,
}

impl TraversalReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn merge(&mut self, other: TraversalReport) {
        self.projects.extend(other.projects);
        self.failures.extend(other.failures);
    }
}

/// グループ配下（サブグループを含む）の全プロジェクトを解決するユースケース
///
/// サブグループごとに個別のタスクで走査する。一覧取得に失敗したサブツリーは
/// [`TraversalReport::failures`] に記録され、兄弟の走査は継続する。
/// 呼び出し全体が失敗するのはルートグループ自身の一覧取得に失敗した場合のみ。
#[derive(Clone)]
pub struct GroupTraverser {
    gateway: Arc<dyn RemoteGateway>,
    cancel: CancellationToken,
}

impl GroupTraverser {
    pub fn new(gateway: Arc<dyn RemoteGateway>) -> Self {
        Self {
            gateway,
            cancel: CancellationToken::new(),
        }
    }

    /// 呼び出し元とキャンセルトークンを共有
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn traverse(&self, root: &str) -> Result<TraversalReport, TraverseGroupError> {
        let root = root.trim_matches('/').to_string();
        info!(group = %root, "Resolving group tree");

        let report = self.traverse_group(root, Vec::new()).await?;

        info!(
            projects = report.projects.len(),
            failed_groups = report.failures.len(),
            "Group tree resolved"
        );
        Ok(report)
    }

    fn traverse_group(
        &self,
        group: String,
        ancestors: Vec<String>,
    ) -> BoxFuture<'static, Result<TraversalReport, TraverseGroupError>> {
        let this = self.clone();
        async move {
            debug!(group = %group, depth = ancestors.len(), "Traversing group");

            // 1. このグループ直下のプロジェクト
            let projects = this
                .cancellable(this.gateway.list_group_projects(&group))
                .await?
                .map_err(|source| TraverseGroupError::ProjectListingFailed {
                    group: group.clone(),
                    source,
                })?;

            // 2. 直下のサブグループ
            let subgroups = this
                .cancellable(this.gateway.list_subgroups(&group))
                .await?
                .map_err(|source| TraverseGroupError::SubgroupListingFailed {
                    group: group.clone(),
                    source,
                })?;

            let mut report = TraversalReport {
                projects,
                failures: Vec::new(),
            };
            if subgroups.is_empty() {
                return Ok(report);
            }

            // 3. サブグループごとに1タスク
            let mut lineage = ancestors;
            lineage.push(group.clone());

            let mut children = ResultAggregator::new();
            for subgroup in subgroups {
                if lineage.contains(&subgroup.full_path) {
                    warn!(group = %subgroup.full_path, parent = %group, "Skipping cyclic subgroup");
                    report.failures.push(GroupFailure {
                        group: subgroup.full_path.clone(),
                        error: TraverseGroupError::CycleDetected {
                            group: subgroup.full_path,
                        },
                    });
                    continue;
                }
                let child = this.traverse_group(subgroup.full_path.clone(), lineage.clone());
                children.spawn(subgroup.full_path, child);
            }

            // 4. 結果の集約
            let joined = children.finish().await;
            if this.cancel.is_cancelled() {
                return Err(TraverseGroupError::Cancelled);
            }

            for (_, child) in joined.successes {
                report.merge(child);
            }
            for (child_group, error) in joined.failures {
                warn!(group = %child_group, "Subgroup traversal failed: {}", error);
                report.failures.push(GroupFailure {
                    group: child_group,
                    error,
                });
            }

            Ok(report)
        }
        .boxed()
    }

    async fn cancellable<F, T>(&self, operation: F) -> Result<T, TraverseGroupError>
    where
        F: Future<Output = T>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(TraverseGroupError::Cancelled),
            output = operation => Ok(output),
        }
    }
}
