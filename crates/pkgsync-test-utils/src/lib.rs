//! Shared test utilities for the pkgsync workspace.
//!
//! This crate provides project fixtures so crate test suites do not each
//! rebuild the same directory layouts. It is a dev-dependency only and is
//! never published.
//!
//! # Modules
//!
//! - [`project`]: [`TestProject`](project::TestProject) builder for a project with packages

pub mod project;

pub use project::TestProject;
