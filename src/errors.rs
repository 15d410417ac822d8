//! Error types for crev.
//!
//! Variants follow how far a failure reaches: configuration errors abort the
//! whole invocation, everything else is scoped to a single unit of a batch.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the caching engine, the pipelines and their collaborators.
#[derive(Error, Debug)]
pub enum CrevError {
    /// Workspace configuration is missing or unusable. Fatal for the invocation.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An input the unit needs (repository checkout, PR directory) is absent.
    #[error("{message}")]
    UnitPrecondition {
        /// Human readable description.
        message: String,
        /// The missing path.
        path: PathBuf,
    },

    /// A producer's external call failed (LLM, unreadable input).
    #[error("Stage `{stage}` failed: {message}")]
    Producer {
        /// Config key of the failing stage.
        stage: String,
        /// Description of the failure.
        message: String,
    },

    /// A producer had to run but one of its inputs was superseded by a later
    /// artifact that is still on disk while the input itself is gone.
    #[error(
        "Stage `{stage}` cannot run: its input `{upstream}` is not on disk. \
         Remove the later artifacts of this unit to force recomputation."
    )]
    UpstreamUnavailable {
        /// Config key of the stage that needed the input.
        stage: String,
        /// Config key of the missing upstream stage.
        upstream: String,
    },

    /// A filename template could not be rendered.
    #[error("Invalid filename template `{template}`: {reason}")]
    Template {
        /// The offending template.
        template: String,
        /// Why rendering failed.
        reason: String,
    },

    /// Reading or writing an artifact failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl CrevError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn producer(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Producer { stage: stage.into(), message: message.into() }
    }

    /// Whether the error must abort the whole invocation instead of one unit.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Result alias used across the crate.
pub type CrevResult<T> = Result<T, CrevError>;
