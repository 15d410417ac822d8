//! Core domain types: workspace configuration and file categories.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// The three buckets the categorization stage sorts repository files into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    App,
    Test,
    Infra,
}

impl Category {
    /// Processing order of the per-category stages.
    pub const ALL: [Category; 3] = [Category::App, Category::Test, Category::Infra];

    /// Lowercase name used in config keys, filenames and the categorization JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::App => "app",
            Category::Test => "test",
            Category::Infra => "infra",
        }
    }

    /// Capitalized name used in rendered headings.
    pub fn title(self) -> &'static str {
        match self {
            Category::App => "App",
            Category::Test => "Test",
            Category::Infra => "Infra",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the categorization stage: repository-relative paths per category.
///
/// Missing keys decode as empty lists and unknown keys are ignored, so a
/// partially well-formed LLM reply still yields a usable value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCategories {
    #[serde(default)]
    pub app: Vec<String>,
    #[serde(default)]
    pub test: Vec<String>,
    #[serde(default)]
    pub infra: Vec<String>,
}

impl FileCategories {
    pub fn files(&self, category: Category) -> &[String] {
        match category {
            Category::App => &self.app,
            Category::Test => &self.test,
            Category::Infra => &self.infra,
        }
    }

    pub fn total(&self) -> usize {
        Category::ALL.iter().map(|c| self.files(*c).len()).sum()
    }
}

/// Workspace configuration (`configs.json` or an equivalent TOML/YAML file).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub repos: Vec<RepoEntry>,
    /// Prompt name → prompt file path, relative to the workspace root.
    pub prompts: BTreeMap<String, String>,
    pub cache_files: CacheFilesConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Upper bound for a single LLM call.
    pub timeout_secs: u64,
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "claude".to_string(),
            model: "claude-sonnet-4-5-20250929".to_string(),
            temperature: None,
            max_tokens: None,
            timeout_secs: 300,
            base_url: None,
        }
    }
}

/// One configured repository.
///
/// `org` and `name` are optional at the serde level so that a malformed entry
/// is skipped with a warning instead of rejecting the whole file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RepoEntry {
    pub org: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    /// Kept loosely typed: non-integer entries are reported and skipped.
    pub pull_requests: Vec<serde_json::Value>,
}

/// Per-pipeline overrides of artifact filename templates, keyed by stage.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CacheFilesConfig {
    pub sum_repo: BTreeMap<String, String>,
    pub sum_pr: BTreeMap<String, String>,
}

/// Workspace-relative locations of inputs and outputs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Checked-out repositories, laid out as `<repos>/<org>/<repo>`.
    pub repos: PathBuf,
    /// Artifact root, laid out as `<data>/<org>/<repo>/...`.
    pub data: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self { repos: PathBuf::from("repos"), data: PathBuf::from("data") }
    }
}
