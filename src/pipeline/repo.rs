//! Repository summarization pipeline.
//!
//! ```text
//! categorization_context -> categorization_result
//!   -> structure_context -> structure_result
//!   -> {app,test,infra}_context -> {app,test,infra}_result
//!   -> output
//! ```

use crate::cache::{from_fn, ArtifactStore, FormatArgs, Producer, StageExecutor, StageReport};
use crate::collect::{collect_category_context, collect_file_listing, collect_structure_context};
use crate::domain::{Category, FileCategories};
use crate::errors::{CrevError, CrevResult};
use crate::git;
use crate::llm::LanguageModel;
use crate::pipeline::stages::{RepoStage, REPO_STAGE_ORDER};
use crate::pipeline::{require, Prompt, PromptedCall, RunOptions};
use crate::workspace::Workspace;

/// Prompt files the repository pipeline loads: categorization, structure,
/// then one per category in [`Category::ALL`] order.
pub const REPO_PROMPTS: [Prompt; 5] = [
    Prompt { key: "sum_repo_file_category", default_path: "prompts/sum_repo_file_category.txt" },
    Prompt { key: "sum_repo_structure", default_path: "prompts/sum_repo_structure.txt" },
    Prompt { key: "sum_repo_app", default_path: "prompts/sum_repo_app.txt" },
    Prompt { key: "sum_repo_test", default_path: "prompts/sum_repo_test.txt" },
    Prompt { key: "sum_repo_infra", default_path: "prompts/sum_repo_infra.txt" },
];

fn category_prompt(category: Category) -> Prompt {
    match category {
        Category::App => REPO_PROMPTS[2],
        Category::Test => REPO_PROMPTS[3],
        Category::Infra => REPO_PROMPTS[4],
    }
}

/// Decode the model's categorization reply.
///
/// The JSON object is taken from the first `{` to the last `}` so that prose
/// or code fences around it are tolerated. Anything undecodable becomes three
/// empty lists.
pub fn parse_categorization_reply(reply: &str) -> FileCategories {
    let object = match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if end > start => &reply[start..=end],
        _ => {
            tracing::warn!("Could not parse file categorization response: no JSON object");
            return FileCategories::default();
        }
    };
    serde_json::from_str(object).unwrap_or_else(|e| {
        tracing::warn!("Could not parse file categorization response: {}", e);
        FileCategories::default()
    })
}

struct Categorize<'a> {
    call: PromptedCall<'a>,
}

impl Producer for Categorize<'_> {
    type Output = FileCategories;

    fn produce(self) -> CrevResult<FileCategories> {
        println!("  Requesting file categorization from LLM...");
        let reply = self.call.call()?;
        let categories = parse_categorization_reply(&reply);
        for category in Category::ALL {
            println!("    {}: {} files", category, categories.files(category).len());
        }
        Ok(categories)
    }
}

/// Assemble the final report from the structure and category summaries.
struct CombineReport<'a> {
    repo: &'a str,
    commit_count: usize,
    short_hash: &'a str,
    structure: Option<&'a String>,
    /// Visited categories; `None` when the summary is not on disk.
    analyses: Vec<(Category, Option<String>)>,
}

impl Producer for CombineReport<'_> {
    type Output = String;

    fn produce(self) -> CrevResult<String> {
        let output = RepoStage::Output.to_string();
        let structure =
            require(self.structure, &output, &RepoStage::StructureResult.to_string())?;

        println!("  Combining summaries...");
        let mut parts = vec![
            format!("# Repository Summary: {}", self.repo),
            format!("\n*Generated from commit #{} ({})*\n", self.commit_count, self.short_hash),
            "---\n".to_string(),
            "## Repository Structure\n".to_string(),
            structure.clone(),
            "\n---\n".to_string(),
        ];

        for (category, summary) in &self.analyses {
            // Empty summaries are never persisted, so a later run sees them as skipped.
            let Some(summary) = summary.as_ref().filter(|s| !s.is_empty()) else {
                tracing::debug!("No {} summary; leaving it out of the report", category);
                continue;
            };
            parts.push(format!("## {} Analysis\n", category.title()));
            parts.push(summary.clone());
            parts.push("\n---\n".to_string());
        }

        Ok(parts.join("\n"))
    }
}

fn prompted<'a>(
    ws: &'a Workspace,
    llm: Option<&'a dyn LanguageModel>,
    stage: RepoStage,
    upstream: RepoStage,
    prompt: Prompt,
    context: Option<&'a String>,
) -> PromptedCall<'a> {
    PromptedCall {
        ws,
        llm,
        stage: stage.to_string(),
        upstream: upstream.to_string(),
        prompt,
        context,
    }
}

/// Summarize the checkout of `org/name`.
///
/// Returns the per-stage outcomes. A missing checkout is a
/// [`CrevError::UnitPrecondition`] and nothing is written.
pub fn summarize_repo(
    ws: &Workspace,
    org: &str,
    name: &str,
    llm: Option<&dyn LanguageModel>,
    opts: RunOptions,
) -> CrevResult<StageReport> {
    println!("Summarizing repository: {org}/{name}");

    let repo_path = ws.repo_path(org, name);
    if !repo_path.is_dir() {
        return Err(CrevError::UnitPrecondition {
            message: format!("Repository '{org}/{name}' not found in {}", repo_path.display()),
            path: repo_path,
        });
    }

    let (commit_count, short_hash) = git::version_info(&repo_path);
    let args = FormatArgs::new()
        .with("org", org)
        .with("repo", name)
        .with("commit_count", commit_count)
        .with("short_hash", &short_hash);
    let store =
        ArtifactStore::new(ws.repo_output_dir(org, name), ws.config().cache_files.sum_repo.clone());
    let mut exec = StageExecutor::new(&store, &args, &REPO_STAGE_ORDER)?;

    let listing = exec
        .run_stage(
            &RepoStage::CategorizationContext.stage(),
            from_fn(|| {
                println!("  Collecting file listing...");
                Ok(collect_file_listing(&repo_path))
            }),
        )?
        .into_value();

    if opts.context_only {
        println!("  Context collection complete (--context-only mode)");
        return Ok(exec.into_report());
    }

    let categories = exec
        .run_stage(
            &RepoStage::CategorizationResult.stage(),
            Categorize {
                call: prompted(
                    ws,
                    llm,
                    RepoStage::CategorizationResult,
                    RepoStage::CategorizationContext,
                    REPO_PROMPTS[0],
                    listing.as_ref(),
                ),
            },
        )?
        .into_value();

    let structure_context = exec
        .run_stage(
            &RepoStage::StructureContext.stage(),
            from_fn(|| {
                let categories = require(
                    categories.as_ref(),
                    "structure_context",
                    "categorization_result",
                )?;
                println!("  Collecting structure information...");
                Ok(collect_structure_context(categories))
            }),
        )?
        .into_value();

    let structure = exec
        .run_stage(
            &RepoStage::StructureResult.stage(),
            prompted(
                ws,
                llm,
                RepoStage::StructureResult,
                RepoStage::StructureContext,
                REPO_PROMPTS[1],
                structure_context.as_ref(),
            ),
        )?
        .into_value();

    let mut analyses = Vec::new();
    for category in Category::ALL {
        if let Some(known) = &categories {
            if known.files(category).is_empty() {
                println!("    Skipping {category} (no files)");
                continue;
            }
        }

        let context_stage = RepoStage::CategoryContext(category);
        let context = exec
            .run_stage(
                &context_stage.stage(),
                from_fn(|| {
                    let known = require(
                        categories.as_ref(),
                        &context_stage.to_string(),
                        "categorization_result",
                    )?;
                    let files = known.files(category);
                    println!("  Collecting {category} context ({} files)...", files.len());
                    Ok(collect_category_context(&repo_path, files, Some(category)))
                }),
            )?
            .into_value();

        let result_stage = RepoStage::CategoryResult(category);
        let summary = exec
            .run_stage(
                &result_stage.stage(),
                prompted(
                    ws,
                    llm,
                    result_stage,
                    context_stage,
                    category_prompt(category),
                    context.as_ref(),
                ),
            )?
            .into_value();
        analyses.push((category, summary));
    }

    exec.run_stage(
        &RepoStage::Output.stage(),
        CombineReport {
            repo: name,
            commit_count,
            short_hash: &short_hash,
            structure: structure.as_ref(),
            analyses,
        },
    )?;

    Ok(exec.into_report())
}
