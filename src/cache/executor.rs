//! Cache-gated stage execution.
//!
//! Every pipeline stage goes through [`StageExecutor::run_stage`], which decides
//! between three outcomes using nothing but file presence:
//!
//! 1. the stage's own artifact exists: read and parse it ([`Outcome::Cached`]);
//! 2. an artifact of a later stage exists: do nothing ([`Outcome::Skipped`]);
//! 3. otherwise run the producer and persist its result ([`Outcome::Computed`]).
//!
//! Producers are only ever invoked in case 3, and a failing producer leaves no
//! artifact behind, so the next run retries exactly that stage.

use crate::cache::store::{ArtifactStore, StageKey, WriteOutcome};
use crate::cache::template::FormatArgs;
use crate::errors::{CrevError, CrevResult};
use std::fmt;

/// A value that can be stored as an artifact and read back.
pub trait ArtifactValue: Sized {
    /// Decode stored text. The error message is wrapped with the stage and path.
    fn parse_artifact(text: &str) -> Result<Self, String>;

    fn render_artifact(&self) -> CrevResult<String>;

    /// Empty values mean "nothing to persist" and are never written.
    fn is_empty_artifact(&self) -> bool;
}

impl ArtifactValue for String {
    fn parse_artifact(text: &str) -> Result<Self, String> {
        Ok(text.to_string())
    }

    fn render_artifact(&self) -> CrevResult<String> {
        Ok(self.clone())
    }

    fn is_empty_artifact(&self) -> bool {
        self.is_empty()
    }
}

/// The work behind a stage, run only on a cache miss.
pub trait Producer {
    type Output: ArtifactValue;

    fn produce(self) -> CrevResult<Self::Output>;
}

/// Adapter turning a closure into a [`Producer`].
pub struct FnProducer<F>(F);

pub fn from_fn<T, F>(f: F) -> FnProducer<F>
where
    T: ArtifactValue,
    F: FnOnce() -> CrevResult<T>,
{
    FnProducer(f)
}

impl<T, F> Producer for FnProducer<F>
where
    T: ArtifactValue,
    F: FnOnce() -> CrevResult<T>,
{
    type Output = T;

    fn produce(self) -> CrevResult<T> {
        (self.0)()
    }
}

/// Stage descriptor: its key and the later stages whose artifacts supersede it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage<K> {
    pub key: K,
    pub downstream: Vec<K>,
}

impl<K: StageKey> Stage<K> {
    pub fn new(key: K, downstream: Vec<K>) -> Self {
        Self { key, downstream }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The stage's artifact already existed.
    Cached(T),
    /// A downstream artifact exists; no work done, nothing written.
    Skipped,
    /// The producer ran; non-empty results were persisted.
    Computed(T),
}

impl<T> Outcome<T> {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Cached(_) => OutcomeKind::Cached,
            Outcome::Skipped => OutcomeKind::Skipped,
            Outcome::Computed(_) => OutcomeKind::Computed,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Cached(v) | Outcome::Computed(v) => Some(v),
            Outcome::Skipped => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Cached,
    Skipped,
    Computed,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutcomeKind::Cached => "cached",
            OutcomeKind::Skipped => "skipped",
            OutcomeKind::Computed => "computed",
        })
    }
}

/// Ordered record of every stage outcome within one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    entries: Vec<(String, OutcomeKind)>,
}

impl StageReport {
    pub fn record(&mut self, stage: impl Into<String>, kind: OutcomeKind) {
        self.entries.push((stage.into(), kind));
    }

    pub fn entries(&self) -> &[(String, OutcomeKind)] {
        &self.entries
    }

    /// Outcome of the most recent run of `stage`, if it ran.
    pub fn outcome_of(&self, stage: &str) -> Option<OutcomeKind> {
        self.entries.iter().rev().find(|(key, _)| key == stage).map(|(_, kind)| *kind)
    }

    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.entries.iter().filter(|(_, k)| *k == kind).count()
    }

    /// Keys of the stages whose producer ran, in execution order.
    pub fn computed(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, k)| *k == OutcomeKind::Computed)
            .map(|(key, _)| key.as_str())
            .collect()
    }
}

/// Runs stages of one unit against one [`ArtifactStore`].
pub struct StageExecutor<'a> {
    store: &'a ArtifactStore,
    args: &'a FormatArgs,
    report: StageReport,
}

impl<'a> StageExecutor<'a> {
    /// Create an executor after checking that every template in `keys`
    /// renders with `args`, so a bad template fails before any I/O.
    pub fn new<K: StageKey>(
        store: &'a ArtifactStore,
        args: &'a FormatArgs,
        keys: &[K],
    ) -> CrevResult<Self> {
        for key in keys {
            store.resolve_path(key, args)?;
        }
        Ok(Self { store, args, report: StageReport::default() })
    }

    pub fn report(&self) -> &StageReport {
        &self.report
    }

    pub fn into_report(self) -> StageReport {
        self.report
    }

    pub fn run_stage<K, P>(&mut self, stage: &Stage<K>, producer: P) -> CrevResult<Outcome<P::Output>>
    where
        K: StageKey,
        P: Producer,
    {
        let stage_name = stage.key.config_key();
        let path = self.store.resolve_path(&stage.key, self.args)?;

        if self.store.exists(&path) {
            tracing::info!("[{}] loading cached result from {}", stage_name, path.display());
            let value = self.load::<P::Output>(&stage_name, &path)?;
            self.report.record(stage_name, OutcomeKind::Cached);
            return Ok(Outcome::Cached(value));
        }

        for later in &stage.downstream {
            let later_path = self.store.resolve_path(later, self.args)?;
            if self.store.exists(&later_path) {
                tracing::info!(
                    "[{}] skipping, later artifact exists: {}",
                    stage_name,
                    later_path.display()
                );
                self.report.record(stage_name, OutcomeKind::Skipped);
                return Ok(Outcome::Skipped);
            }
        }

        tracing::info!("[{}] running, will cache to {}", stage_name, path.display());
        let value = producer.produce()?;

        if value.is_empty_artifact() {
            tracing::debug!("[{}] producer returned nothing; no artifact written", stage_name);
            self.report.record(stage_name, OutcomeKind::Computed);
            return Ok(Outcome::Computed(value));
        }

        let text = value.render_artifact()?;
        match self.store.create(&path, &text)? {
            WriteOutcome::Created => {
                tracing::info!("[{}] cached result saved to {}", stage_name, path.display());
                self.report.record(stage_name, OutcomeKind::Computed);
                Ok(Outcome::Computed(value))
            }
            WriteOutcome::AlreadyExists => {
                tracing::warn!(
                    "[{}] {} was written by another process; keeping that artifact",
                    stage_name,
                    path.display()
                );
                let existing = self.load::<P::Output>(&stage_name, &path)?;
                self.report.record(stage_name, OutcomeKind::Cached);
                Ok(Outcome::Cached(existing))
            }
        }
    }

    fn load<T: ArtifactValue>(&self, stage_name: &str, path: &std::path::Path) -> CrevResult<T> {
        let text = self.store.read(path)?;
        T::parse_artifact(&text).map_err(|e| {
            CrevError::producer(
                stage_name,
                format!("cached artifact {} is unreadable ({e}); delete it to recompute", path.display()),
            )
        })
    }
}
