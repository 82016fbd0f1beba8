pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use colored::Colorize;
use std::path::PathBuf;
use std::process::exit;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::application::use_cases::clone_projects::{
    DEFAULT_CLONE_ROOT, DEFAULT_MAX_CONCURRENT_CLONES,
};
use crate::infrastructure::gitlab::DEFAULT_GITLAB_URL;

use commands::{
    job_action_from_flags, CloneCommand, CommandContext, CompletionCommand, PipelineCommand,
    TreeCommand,
};

/// Output format options for the tree command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One namespace path per line (default)
    Text,
    /// JSON array of projects
    Json,
    /// YAML list of projects
    Yaml,
}

/// gctl - Discover and bulk-clone GitLab group trees
#[derive(Parser)]
#[command(name = "gctl")]
#[command(about = "Discover and bulk-clone the projects of a GitLab group tree")]
#[command(version, long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GCTL_GIT_HASH"),
    " ",
    env!("GCTL_BUILD_DATE"),
    ")"
))]
#[command(propagate_version = true)]
pub struct Cli {
    /// Personal access token used for the API and for git over HTTPS
    #[arg(long, env = "GITLAB_ACCESS_TOKEN", global = true, hide_env_values = true)]
    pub gitlab_access_token: Option<String>,

    /// Web root of the GitLab instance
    #[arg(long, env = "GITLAB_URL", global = true, default_value = DEFAULT_GITLAB_URL)]
    pub gitlab_url: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every project below a group, including nested subgroups
    Tree {
        /// Full path of the root group, e.g. `org/team`
        #[arg(short, long, env = "GITLAB_GROUP")]
        group: String,

        /// Output format (text, json, yaml)
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Clone every project below a group
    Clone {
        /// Full path of the root group, e.g. `org/team`
        #[arg(short, long, env = "GITLAB_GROUP")]
        group: String,

        /// Directory that receives the working copies
        #[arg(short, long, default_value = DEFAULT_CLONE_ROOT)]
        directory: PathBuf,

        /// Maximum number of concurrent clones
        #[arg(short, long, default_value_t = DEFAULT_MAX_CONCURRENT_CLONES)]
        jobs: usize,

        /// Skip submodule initialization
        #[arg(long)]
        no_submodules: bool,
    },

    /// Show or control the CI pipelines of a project
    Pipeline {
        /// Namespace path of the project, e.g. `org/team/service`
        #[arg(short, long)]
        namespace: String,

        /// Print the log of a job
        #[arg(long, value_name = "JOB_ID", group = "job_action")]
        trace: Option<u64>,

        /// Trigger a manual job
        #[arg(long, value_name = "JOB_ID", group = "job_action")]
        play: Option<u64>,

        /// Retry a job
        #[arg(long, value_name = "JOB_ID", group = "job_action")]
        retry: Option<u64>,

        /// Cancel a job
        #[arg(long, value_name = "JOB_ID", group = "job_action")]
        cancel: Option<u64>,
    },

    /// Generate a shell completion script
    #[command(hide = true)]
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}

impl CliApp {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    pub fn from_cli(cli: Cli) -> Self {
        Self { cli }
    }

    /// Default tracing filter when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &'static str {
        if self.cli.verbose {
            "warn,gctl=debug"
        } else {
            "warn,gctl=info"
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        colored::control::set_override(!self.cli.no_color);

        let cancel = CancellationToken::new();
        let interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling outstanding work");
                interrupt.cancel();
            }
        });

        match self.handle_command(cancel).await {
            Ok(_) => Ok(()),
            Err(e) => {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
                exit(1);
            }
        }
    }

    async fn handle_command(&self, cancel: CancellationToken) -> anyhow::Result<()> {
        let context = CommandContext::new(
            self.cli.gitlab_url.clone(),
            self.cli.gitlab_access_token.clone(),
            cancel,
        );

        match &self.cli.command {
            Commands::Tree { group, output } => {
                TreeCommand::new(group.clone(), *output)
                    .execute(&context)
                    .await
            }
            Commands::Clone {
                group,
                directory,
                jobs,
                no_submodules,
            } => {
                CloneCommand::new(group.clone(), directory.clone(), *jobs, !no_submodules)
                    .execute(&context)
                    .await
            }
            Commands::Pipeline {
                namespace,
                trace,
                play,
                retry,
                cancel,
            } => {
                let action = job_action_from_flags(*trace, *play, *retry, *cancel);
                PipelineCommand::new(namespace.clone(), action)
                    .execute(&context)
                    .await
            }
            Commands::Completion { shell } => {
                CompletionCommand::new(*shell).execute();
                Ok(())
            }
        }
    }
}
