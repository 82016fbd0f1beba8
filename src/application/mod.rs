/// アプリケーション層
///
/// ドメイン層とインフラ層を組み合わせたユースケースを提供:
/// - サブグループごとのタスクによるグループツリー走査
/// - 同時実行数を制限した一括クローン
/// - 単一プロジェクトのパイプライン状態とジョブ操作
/// - 生成したタスク結果のキー付き集約
pub mod services;
pub mod use_cases;

pub use services::result_aggregator::{Aggregated, ResultAggregator, TaskPanicked};
pub use use_cases::clone_projects::{
    CloneOutcome, CloneProjectsConfig, CloneProjectsError, CloneProjectsUseCase, CloneReport,
};
pub use use_cases::pipeline_overview::{
    JobAction, JobActionOutput, PipelineOverview, PipelineOverviewUseCase, PipelineRun,
};
pub use use_cases::traverse_group::{
    GroupFailure, GroupTraverser, TraversalReport, TraverseGroupError,
};
