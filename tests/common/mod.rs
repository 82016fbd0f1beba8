//! Common test utilities and helpers
//!
//! In-memory stand-ins for the GitLab API and for git, plus fixtures for
//! real local repositories.

#![allow(dead_code)]

pub mod fake_cloner;
pub mod fake_gateway;
pub mod fixtures;
