//! Stage keys of the two pipelines and their default artifact filenames.

use crate::cache::{ArtifactValue, Stage, StageKey};
use crate::domain::{Category, FileCategories};
use crate::errors::{CrevError, CrevResult};
use std::fmt;

/// Stages of the repository pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoStage {
    CategorizationContext,
    CategorizationResult,
    StructureContext,
    StructureResult,
    CategoryContext(Category),
    CategoryResult(Category),
    Output,
}

/// Execution order; every stage is superseded by the stages after it.
pub const REPO_STAGE_ORDER: [RepoStage; 11] = [
    RepoStage::CategorizationContext,
    RepoStage::CategorizationResult,
    RepoStage::StructureContext,
    RepoStage::StructureResult,
    RepoStage::CategoryContext(Category::App),
    RepoStage::CategoryResult(Category::App),
    RepoStage::CategoryContext(Category::Test),
    RepoStage::CategoryResult(Category::Test),
    RepoStage::CategoryContext(Category::Infra),
    RepoStage::CategoryResult(Category::Infra),
    RepoStage::Output,
];

impl RepoStage {
    pub fn downstream(self) -> Vec<RepoStage> {
        REPO_STAGE_ORDER
            .iter()
            .position(|s| *s == self)
            .map(|pos| REPO_STAGE_ORDER[pos + 1..].to_vec())
            .unwrap_or_default()
    }

    pub fn stage(self) -> Stage<RepoStage> {
        Stage::new(self, self.downstream())
    }
}

impl StageKey for RepoStage {
    fn config_key(&self) -> String {
        match self {
            RepoStage::CategorizationContext => "categorization_context".to_string(),
            RepoStage::CategorizationResult => "categorization_result".to_string(),
            RepoStage::StructureContext => "structure_context".to_string(),
            RepoStage::StructureResult => "structure_result".to_string(),
            RepoStage::CategoryContext(c) => format!("{c}_context"),
            RepoStage::CategoryResult(c) => format!("{c}_result"),
            RepoStage::Output => "output".to_string(),
        }
    }

    fn default_template(&self) -> String {
        match self {
            RepoStage::CategorizationContext => "sum_repo.categorization.context.md".to_string(),
            RepoStage::CategorizationResult => "sum_repo.categorization.json".to_string(),
            RepoStage::StructureContext => "sum_repo.structure.context.md".to_string(),
            RepoStage::StructureResult => "sum_repo.structure.md".to_string(),
            RepoStage::CategoryContext(c) => format!("sum_repo.{c}.context.md"),
            RepoStage::CategoryResult(c) => format!("sum_repo.{c}.md"),
            RepoStage::Output => "sum.repo.{commit_count}.{short_hash}.ai.md".to_string(),
        }
    }
}

impl fmt::Display for RepoStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.config_key())
    }
}

/// Stages of the pull-request pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrStage {
    Context,
    Output,
}

impl PrStage {
    pub const ALL: [PrStage; 2] = [PrStage::Context, PrStage::Output];

    pub fn stage(self) -> Stage<PrStage> {
        match self {
            PrStage::Context => Stage::new(self, vec![PrStage::Output]),
            PrStage::Output => Stage::new(self, Vec::new()),
        }
    }
}

impl StageKey for PrStage {
    fn config_key(&self) -> String {
        match self {
            PrStage::Context => "context".to_string(),
            PrStage::Output => "output".to_string(),
        }
    }

    fn default_template(&self) -> String {
        match self {
            PrStage::Context => "sum.pr.{pr_number}.context.md".to_string(),
            PrStage::Output => "sum.pr.{pr_number}.ai.md".to_string(),
        }
    }
}

impl fmt::Display for PrStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.config_key())
    }
}

/// Stored as pretty JSON. Always persisted, even with three empty lists.
impl ArtifactValue for FileCategories {
    fn parse_artifact(text: &str) -> Result<Self, String> {
        serde_json::from_str(text).map_err(|e| e.to_string())
    }

    fn render_artifact(&self) -> CrevResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CrevError::producer("categorization_result", e.to_string()))
    }

    fn is_empty_artifact(&self) -> bool {
        false
    }
}
