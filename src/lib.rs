//! # gctl - GitLab group tree tool
//!
//! `gctl` discovers every project below a GitLab group, however deeply its
//! subgroups are nested, and clones them in bulk with a bounded number of
//! concurrent clones. It also shows the CI pipelines of a single project and
//! can trace, play, retry or cancel their jobs.
//!
//! ## Quick Start
//!
//! ```bash
//! export GITLAB_ACCESS_TOKEN=glpat-...
//!
//! # List every project below a group
//! gctl tree --group my-org
//!
//! # Clone them into /tmp/gctl/, ten at a time
//! gctl clone --group my-org --jobs 10
//! ```
//!
//! ## Architecture
//!
//! - [`domain`]: Projects, groups, pipelines and the access credential
//! - [`application`]: Group traversal, bulk cloning and pipeline use cases
//! - [`infrastructure`]: GitLab REST client and libgit2 cloner
//! - [`presentation`]: CLI interface and terminal output
//! - [`common`]: Shared error handling
//!
//! ## Failure model
//!
//! Work is fanned out one task per subgroup and one task per project.
//! A failing subgroup or clone never discards what its siblings produced:
//! [`application::TraversalReport`] and [`application::CloneReport`] carry
//! every success next to every failure.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gctl::application::{CloneProjectsConfig, CloneProjectsUseCase, GroupTraverser};
//! use gctl::domain::value_objects::Credential;
//! use gctl::infrastructure::{Git2Cloner, GitLabClient, GitLabConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let credential = Credential::new("glpat-...")?;
//! let gateway = GitLabClient::new(GitLabConfig::new("https://gitlab.com"), credential.clone())?;
//!
//! let tree = GroupTraverser::new(Arc::new(gateway)).traverse("my-org").await?;
//!
//! let config = CloneProjectsConfig::new("/tmp/gctl").with_max_concurrent(4);
//! let report = CloneProjectsUseCase::new(config, Arc::new(Git2Cloner::new()))
//!     .execute(tree.projects, &credential)
//!     .await?;
//!
//! println!("{} cloned, {} failed", report.successful_count(), report.failed_count());
//! # Ok(())
//! # }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Re-export commonly used types for convenience
pub use crate::common::error::GctlError;
pub use crate::common::result::GctlResult as Result;
