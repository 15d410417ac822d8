//! Summarization pipelines
//!
//! A pipeline is a fixed sequence of stages run through one
//! [`StageExecutor`](crate::cache::StageExecutor) per unit. Both pipelines are
//! re-entered from the top on every run and let the cache decide what to do.

pub mod pr;
pub mod repo;
pub mod stages;

pub use pr::{summarize_pr, PR_PROMPTS};
pub use repo::{parse_categorization_reply, summarize_repo, REPO_PROMPTS};
pub use stages::{PrStage, RepoStage, REPO_STAGE_ORDER};

use crate::cache::Producer;
use crate::errors::{CrevError, CrevResult};
use crate::llm::LanguageModel;
use crate::workspace::Workspace;

/// Per-invocation switches shared by both pipelines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Stop after the first context artifact; the model is never called.
    pub context_only: bool,
}

/// A prompt file: its key in the `prompts` config section and its default path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prompt {
    pub key: &'static str,
    pub default_path: &'static str,
}

/// Check that every prompt a pipeline may load is on disk.
///
/// Run before the first unit of a batch, so a missing prompt aborts the
/// invocation before any artifact is written.
pub fn check_prompts(ws: &Workspace, prompts: &[Prompt]) -> CrevResult<()> {
    for prompt in prompts {
        ws.check_prompt(prompt.key, prompt.default_path)?;
    }
    Ok(())
}

/// Send `prompt` to the model on behalf of `stage`.
pub(crate) fn ask(llm: Option<&dyn LanguageModel>, stage: &str, prompt: &str) -> CrevResult<String> {
    let llm = llm.ok_or_else(|| {
        CrevError::Configuration(format!("stage `{stage}` needs a language model but none was configured"))
    })?;
    llm.invoke(prompt).map_err(|e| CrevError::producer(stage, format!("{e:#}")))
}

/// Unwrap an input that a producer is about to consume.
pub(crate) fn require<'v, T>(value: Option<&'v T>, stage: &str, upstream: &str) -> CrevResult<&'v T> {
    value.ok_or_else(|| CrevError::UpstreamUnavailable {
        stage: stage.to_string(),
        upstream: upstream.to_string(),
    })
}

/// Prompt file + `\n\n` + context, sent to the model.
///
/// The prompt is only read when the producer actually runs, so fully cached
/// units never need the prompt files.
pub(crate) struct PromptedCall<'a> {
    pub ws: &'a Workspace,
    pub llm: Option<&'a dyn LanguageModel>,
    pub stage: String,
    pub upstream: String,
    pub prompt: Prompt,
    pub context: Option<&'a String>,
}

impl PromptedCall<'_> {
    pub(crate) fn call(self) -> CrevResult<String> {
        let context = require(self.context, &self.stage, &self.upstream)?;
        let template = self.ws.load_prompt(self.prompt.key, self.prompt.default_path)?;
        ask(self.llm, &self.stage, &format!("{template}\n\n{context}"))
    }
}

impl Producer for PromptedCall<'_> {
    type Output = String;

    fn produce(self) -> CrevResult<String> {
        self.call()
    }
}
