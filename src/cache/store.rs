//! Artifact storage.
//!
//! The store is the only component that touches the filesystem on behalf of
//! the executor. It maps stage keys to paths inside one unit's output
//! directory and reads or writes whole files.

use crate::cache::template::{render_template, FormatArgs};
use crate::errors::{CrevError, CrevResult};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

/// Identifies a stage within a pipeline and supplies its default filename.
pub trait StageKey: Copy + Eq + std::fmt::Debug {
    /// Key used in the `cache_files` configuration section and in logs.
    fn config_key(&self) -> String;

    /// Built-in filename template used when the configuration has no override.
    fn default_template(&self) -> String;
}

/// Result of an exclusive create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    /// Another writer got there first; the existing file was left untouched.
    AlreadyExists,
}

/// Filesystem-backed artifact store for one unit.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    output_dir: PathBuf,
    overrides: BTreeMap<String, String>,
}

impl ArtifactStore {
    /// `overrides` maps stage config keys to filename templates.
    pub fn new(output_dir: impl Into<PathBuf>, overrides: BTreeMap<String, String>) -> Self {
        Self { output_dir: output_dir.into(), overrides }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Configured template for `key`, falling back to its built-in default.
    pub fn template_for<K: StageKey>(&self, key: &K) -> String {
        self.overrides.get(&key.config_key()).cloned().unwrap_or_else(|| key.default_template())
    }

    /// Resolve the artifact path of `key`. Performs no I/O.
    ///
    /// The rendered filename must stay inside the output directory: absolute
    /// paths and `..` components are template errors.
    pub fn resolve_path<K: StageKey>(&self, key: &K, args: &FormatArgs) -> CrevResult<PathBuf> {
        let template = self.template_for(key);
        let filename = render_template(&template, args)?;
        let relative = Path::new(&filename);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
            && relative.components().any(|c| matches!(c, Component::Normal(_)));
        if !contained {
            return Err(CrevError::Template {
                template,
                reason: format!("'{filename}' resolves outside the output directory"),
            });
        }
        Ok(self.output_dir.join(relative))
    }

    pub fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    pub fn read(&self, path: &Path) -> CrevResult<String> {
        fs::read_to_string(path).map_err(|e| CrevError::io(path, e))
    }

    /// Write `content` to `path`, replacing any existing file.
    pub fn write(&self, path: &Path, content: &str) -> CrevResult<()> {
        ensure_parent(path)?;
        fs::write(path, content).map_err(|e| CrevError::io(path, e))
    }

    /// Write `content` to `path` only if nothing is there yet.
    ///
    /// Two processes racing on the same unit both run the producer, but only
    /// the first one to create the file persists its result.
    pub fn create(&self, path: &Path, content: &str) -> CrevResult<WriteOutcome> {
        ensure_parent(path)?;
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Ok(WriteOutcome::AlreadyExists)
            }
            Err(e) => return Err(CrevError::io(path, e)),
        };

        let written = file.write_all(content.as_bytes()).and_then(|()| file.flush());
        if let Err(e) = written {
            drop(file);
            // A half-written artifact would read as complete on the next run.
            let _ = fs::remove_file(path);
            return Err(CrevError::io(path, e));
        }
        Ok(WriteOutcome::Created)
    }
}

fn ensure_parent(path: &Path) -> CrevResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CrevError::io(parent, e))?;
    }
    Ok(())
}
