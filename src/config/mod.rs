//! Workspace configuration loading
//!
//! The workspace config lists the repositories and pull requests to process,
//! the prompt files, the LLM settings and per-stage filename overrides.

pub mod loader;

pub use loader::load_config;
