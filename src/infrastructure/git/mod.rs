//! Local working copy creation.
pub mod cloner;
pub mod git2_cloner;

pub use cloner::{CloneError, CloneRequest, RepositoryCloner, WorkingCopy};
pub use git2_cloner::Git2Cloner;
