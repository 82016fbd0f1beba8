use anyhow::Result;
use colored::Colorize;

use super::{require_group, CommandContext};
use crate::application::use_cases::traverse_group::{GroupTraverser, TraversalReport};
use crate::common::GctlError;
use crate::domain::entities::Project;
use crate::presentation::cli::OutputFormat;

/// Handler for the tree command
pub struct TreeCommand {
    pub group: String,
    pub output: OutputFormat,
}

impl TreeCommand {
    pub fn new(group: String, output: OutputFormat) -> Self {
        Self { group, output }
    }

    pub async fn execute(&self, context: &CommandContext) -> Result<()> {
        let group = require_group(&self.group)?;
        let credential = context.credential()?;
        let gateway = context.gateway(&credential)?;

        let mut report = GroupTraverser::new(gateway)
            .with_cancellation(context.cancel.clone())
            .traverse(&group)
            .await
            .map_err(GctlError::from)?;

        report
            .projects
            .sort_by(|a, b| a.namespace_path.cmp(&b.namespace_path));

        println!("{}", render(&report.projects, self.output)?);
        print_failures(&report);
        Ok(())
    }
}

fn render(projects: &[Project], format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Text => projects
            .iter()
            .map(|p| p.namespace_path.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => serde_json::to_string_pretty(projects).map_err(GctlError::from)?,
        OutputFormat::Yaml => serde_yaml::to_string(projects).map_err(GctlError::from)?,
    };
    Ok(rendered)
}

pub(crate) fn print_failures(report: &TraversalReport) {
    if report.failures.is_empty() {
        return;
    }
    eprintln!(
        "{} {} group(s) could not be fully resolved:",
        "⚠".yellow().bold(),
        report.failures.len()
    );
    for failure in &report.failures {
        eprintln!("  {} {}", failure.group.red(), failure.error);
    }
}
