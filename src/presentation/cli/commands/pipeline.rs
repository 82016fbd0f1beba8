use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};

use super::CommandContext;
use crate::application::use_cases::pipeline_overview::{
    JobAction, JobActionOutput, PipelineOverview, PipelineOverviewUseCase,
};
use crate::common::GctlError;
use crate::domain::entities::{CiStatus, Job};

/// Map the mutually exclusive job flags to a single action
pub fn job_action_from_flags(
    trace: Option<u64>,
    play: Option<u64>,
    retry: Option<u64>,
    cancel: Option<u64>,
) -> Option<JobAction> {
    trace
        .map(JobAction::Trace)
        .or(play.map(JobAction::Play))
        .or(retry.map(JobAction::Retry))
        .or(cancel.map(JobAction::Cancel))
}

/// Handler for the pipeline command
pub struct PipelineCommand {
    pub namespace: String,
    pub action: Option<JobAction>,
}

impl PipelineCommand {
    pub fn new(namespace: String, action: Option<JobAction>) -> Self {
        Self { namespace, action }
    }

    pub async fn execute(&self, context: &CommandContext) -> Result<()> {
        let namespace = self.namespace.trim().trim_matches('/');
        if namespace.is_empty() {
            return Err(GctlError::validation_error(
                "namespace",
                "project namespace must not be empty",
                Some(self.namespace.clone()),
            )
            .into());
        }
        let credential = context.credential()?;
        let use_case = PipelineOverviewUseCase::new(context.gateway(&credential)?);

        match self.action {
            None => {
                let overview = use_case
                    .overview(namespace)
                    .await
                    .map_err(GctlError::from)?;
                print_overview(&overview);
            }
            Some(action) => {
                let output = use_case
                    .run_action(namespace, action)
                    .await
                    .map_err(GctlError::from)?;
                match output {
                    JobActionOutput::Trace(log) => print!("{}", log),
                    JobActionOutput::Updated(job) => {
                        println!("{} {}", "✓".green().bold(), format_job(&job));
                    }
                }
            }
        }
        Ok(())
    }
}

fn print_overview(overview: &PipelineOverview) {
    println!(
        "{} {}",
        "::".blue().bold(),
        overview.project.namespace_path.bold()
    );
    if overview.runs.is_empty() {
        println!("  No pipelines");
        return;
    }

    for run in &overview.runs {
        let pipeline = &run.pipeline;
        println!(
            "  #{} {} {} {} {}",
            pipeline.id,
            colorize(pipeline.status),
            pipeline.git_ref.as_deref().unwrap_or("-"),
            pipeline.short_sha(),
            format_time(pipeline.created_at)
        );
        for job in &run.jobs {
            println!("      {}", format_job(job));
        }
    }
}

fn format_job(job: &Job) -> String {
    let duration = job
        .duration
        .map(|seconds| format!("{:.0}s", seconds))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{} {} [{}] {} {}",
        job.id,
        job.name,
        job.stage,
        colorize(job.status),
        duration
    )
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn colorize(status: CiStatus) -> ColoredString {
    let label = status.as_str();
    match status {
        CiStatus::Success => label.green(),
        CiStatus::Failed => label.red(),
        CiStatus::Canceled | CiStatus::Skipped => label.dimmed(),
        CiStatus::Manual | CiStatus::Scheduled => label.cyan(),
        _ if status.is_active() => label.yellow(),
        _ => label.normal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_job_action_from_flags() {
        assert_eq!(job_action_from_flags(None, None, None, None), None);
        assert_eq!(
            job_action_from_flags(Some(3), None, None, None),
            Some(JobAction::Trace(3))
        );
        assert_eq!(
            job_action_from_flags(None, None, Some(9), None),
            Some(JobAction::Retry(9))
        );
        assert_eq!(
            job_action_from_flags(None, None, None, Some(1)),
            Some(JobAction::Cancel(1))
        );
    }

    #[test]
    fn test_format_time() {
        let time = Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 0).unwrap();
        assert_eq!(format_time(Some(time)), "2024-03-01 09:05");
        assert_eq!(format_time(None), "-");
    }

    #[test]
    fn test_format_job_contains_stage_and_duration() {
        colored::control::set_override(false);
        let job: Job = serde_json::from_value(serde_json::json!({
            "id": 12,
            "name": "lint",
            "stage": "check",
            "status": "success",
            "duration": 41.6,
        }))
        .unwrap();
        assert_eq!(format_job(&job), "12 lint [check] success 42s");
    }
}
