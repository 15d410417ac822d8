//! The workspace: a root directory plus its loaded configuration.
//!
//! Every path the pipelines touch is derived from this value; nothing depends
//! on the process working directory.

use crate::config::load_config;
use crate::domain::Config;
use crate::errors::{CrevError, CrevResult};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    /// Load the configuration found in (or given relative to) `root`.
    pub fn load(root: impl Into<PathBuf>, config_path: Option<&Path>) -> CrevResult<Self> {
        let root = root.into();
        let config = load_config(&root, config_path)?;
        Ok(Self { root, config })
    }

    pub fn from_config(root: impl Into<PathBuf>, config: Config) -> Self {
        Self { root: root.into(), config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Checkout of `org/name`.
    pub fn repo_path(&self, org: &str, name: &str) -> PathBuf {
        self.root.join(&self.config.paths.repos).join(org).join(name)
    }

    /// Artifact directory for the repository pipeline of `org/name`.
    pub fn repo_output_dir(&self, org: &str, name: &str) -> PathBuf {
        self.root.join(&self.config.paths.data).join(org).join(name).join("sum")
    }

    /// Directory holding the extracted inputs and the artifacts of one PR.
    pub fn pr_dir(&self, org: &str, name: &str, pr_number: u64) -> PathBuf {
        self.root.join(&self.config.paths.data).join(org).join(name).join(pr_number.to_string())
    }

    /// Location of the prompt configured under `key`, or `default_path` when unset.
    pub fn prompt_path(&self, key: &str, default_path: &str) -> PathBuf {
        let rel = self.config.prompts.get(key).map(String::as_str).unwrap_or(default_path);
        self.root.join(rel)
    }

    /// Fail when the prompt configured under `key` is not a readable file.
    pub fn check_prompt(&self, key: &str, default_path: &str) -> CrevResult<PathBuf> {
        let path = self.prompt_path(key, default_path);
        if !path.is_file() {
            return Err(CrevError::Configuration(format!(
                "Prompt file '{}' not found (prompt `{key}`)",
                path.display()
            )));
        }
        Ok(path)
    }

    /// Read the prompt configured under `key`, or `default_path` when unset.
    pub fn load_prompt(&self, key: &str, default_path: &str) -> CrevResult<String> {
        let path = self.check_prompt(key, default_path)?;
        fs::read_to_string(&path).map_err(|e| {
            CrevError::Configuration(format!("Failed reading prompt file {}: {e}", path.display()))
        })
    }
}
