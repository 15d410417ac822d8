//! Artifact store and cache-gated stage executor

pub mod executor;
pub mod store;
pub mod template;

pub use executor::{
    from_fn, ArtifactValue, Outcome, OutcomeKind, Producer, Stage, StageExecutor, StageReport,
};
pub use store::{ArtifactStore, StageKey, WriteOutcome};
pub use template::{render_template, FormatArgs};
