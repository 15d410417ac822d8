//! Pull-request summarization pipeline: `context -> output`.

use crate::cache::{from_fn, ArtifactStore, FormatArgs, StageExecutor, StageReport};
use crate::collect::collect_pr_context;
use crate::errors::{CrevError, CrevResult};
use crate::llm::LanguageModel;
use crate::pipeline::stages::PrStage;
use crate::pipeline::{Prompt, PromptedCall, RunOptions};
use crate::workspace::Workspace;

/// Prompt files the PR pipeline loads.
pub const PR_PROMPTS: [Prompt; 1] =
    [Prompt { key: "sum_pr", default_path: "prompts/sum.pr.txt" }];

/// Summarize one extracted pull request of `org/name`.
///
/// Inputs and artifacts share the PR directory. A missing PR directory is a
/// [`CrevError::UnitPrecondition`].
pub fn summarize_pr(
    ws: &Workspace,
    org: &str,
    name: &str,
    pr_number: u64,
    llm: Option<&dyn LanguageModel>,
    opts: RunOptions,
) -> CrevResult<StageReport> {
    println!("Summarizing PR #{pr_number} for {org}/{name}");

    let pr_dir = ws.pr_dir(org, name, pr_number);
    if !pr_dir.is_dir() {
        return Err(CrevError::UnitPrecondition {
            message: format!(
                "PR directory not found: {}. Extract the PR data first.",
                pr_dir.display()
            ),
            path: pr_dir,
        });
    }

    let args = FormatArgs::new().with("org", org).with("repo", name).with("pr_number", pr_number);
    let store = ArtifactStore::new(&pr_dir, ws.config().cache_files.sum_pr.clone());
    let mut exec = StageExecutor::new(&store, &args, &PrStage::ALL)?;

    let context = exec
        .run_stage(
            &PrStage::Context.stage(),
            from_fn(|| {
                println!("  Collecting PR context...");
                Ok(collect_pr_context(&pr_dir))
            }),
        )?
        .into_value();

    if opts.context_only {
        println!("  Context collection complete (--context-only mode)");
        return Ok(exec.into_report());
    }

    exec.run_stage(
        &PrStage::Output.stage(),
        PromptedCall {
            ws,
            llm,
            stage: PrStage::Output.to_string(),
            upstream: PrStage::Context.to_string(),
            prompt: PR_PROMPTS[0],
            context: context.as_ref(),
        },
    )?;

    Ok(exec.into_report())
}
