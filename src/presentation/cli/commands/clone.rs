use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use super::tree::print_failures;
use super::{require_group, CommandContext};
use crate::application::use_cases::clone_projects::{
    CloneProjectsConfig, CloneProjectsUseCase, CloneReport,
};
use crate::application::use_cases::traverse_group::GroupTraverser;
use crate::common::GctlError;
use crate::infrastructure::git::Git2Cloner;

/// Handler for the clone command
pub struct CloneCommand {
    pub group: String,
    pub directory: PathBuf,
    pub jobs: usize,
    pub recurse_submodules: bool,
}

impl CloneCommand {
    pub fn new(group: String, directory: PathBuf, jobs: usize, recurse_submodules: bool) -> Self {
        Self {
            group,
            directory,
            jobs,
            recurse_submodules,
        }
    }

    fn config(&self, context: &CommandContext) -> CloneProjectsConfig {
        CloneProjectsConfig::new(&self.directory)
            .with_max_concurrent(self.jobs)
            .with_recurse_submodules(self.recurse_submodules)
            .with_clone_base_url(&context.gitlab_url)
    }

    pub async fn execute(&self, context: &CommandContext) -> Result<()> {
        // Everything that can be checked locally is checked before the first request.
        let config = self.config(context);
        config.validate().map_err(GctlError::from)?;
        let group = require_group(&self.group)?;
        let credential = context.credential()?;
        let gateway = context.gateway(&credential)?;

        println!("{} Resolving group {}...", "::".blue().bold(), group.bold());
        let traversal = GroupTraverser::new(gateway)
            .with_cancellation(context.cancel.clone())
            .traverse(&group)
            .await
            .map_err(GctlError::from)?;
        print_failures(&traversal);
        let unresolved_groups = traversal.failures.len();

        println!(
            "{} Cloning {} project(s) into {} ({} at a time)...",
            "::".blue().bold(),
            traversal.projects.len(),
            config.destination.display(),
            config.max_concurrent
        );

        let use_case = CloneProjectsUseCase::new(config, Arc::new(Git2Cloner::new()))
            .with_cancellation(context.cancel.clone());
        let report = use_case
            .execute(traversal.projects, &credential)
            .await
            .map_err(GctlError::from)?;

        print_summary(&report);

        if context.cancel.is_cancelled() {
            return Err(GctlError::Cancelled.into());
        }
        if !report.is_success() {
            return Err(anyhow::anyhow!(
                "{} of {} clone(s) failed",
                report.failed_count(),
                report.outcomes.len()
            ));
        }
        if unresolved_groups > 0 {
            return Err(anyhow::anyhow!(
                "{} group(s) could not be resolved; their projects were not cloned",
                unresolved_groups
            ));
        }
        Ok(())
    }
}

fn print_summary(report: &CloneReport) {
    println!(
        "{} Cloned {} project(s), {} failed",
        if report.is_success() {
            "✓".green().bold()
        } else {
            "✗".red().bold()
        },
        report.successful_count(),
        report.failed_count()
    );

    if report.is_success() {
        return;
    }
    println!("{} Failed clones:", "⚠".yellow().bold());
    for (outcome, error) in report.failures() {
        println!("  {}", outcome.destination.display().to_string().red());
        println!("    {}", error);
    }
}
