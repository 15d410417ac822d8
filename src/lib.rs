//! crev: cache-gated LLM summaries of repositories and pull requests
//!
//! Every pipeline stage persists its result as a file under the workspace's
//! data directory. Re-running a pipeline reuses whatever is already on disk,
//! so an interrupted run resumes at the first missing artifact.

pub mod batch;
pub mod cache;
pub mod cli;
pub mod collect;
pub mod config;
pub mod domain;
pub mod errors;
pub mod git;
pub mod llm;
pub mod pipeline;
pub mod utils;
pub mod workspace;

pub use errors::{CrevError, CrevResult};
pub use workspace::Workspace;
