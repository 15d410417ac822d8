//! Sum command implementation

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::Path;

use super::utils::parse_pr_selector;
use crate::batch::{run_batch, select_prs, select_repos, BatchSummary, PrUnit, RepoUnit, Selector};
use crate::llm::{build_client, LanguageModel};
use crate::pipeline::{
    check_prompts, summarize_pr, summarize_repo, Prompt, RunOptions, PR_PROMPTS, REPO_PROMPTS,
};
use crate::workspace::Workspace;

#[derive(Args)]
pub struct SumArgs {
    #[command(subcommand)]
    pub target: Option<SumTarget>,

    /// Only collect and cache context without generating summaries
    #[arg(long)]
    pub context_only: bool,
}

#[derive(Subcommand)]
pub enum SumTarget {
    /// Summarize repository purpose, tech stack and architecture
    ///
    /// Examples: `crev sum repo`, `crev sum repo myorg`, `crev sum repo . myrepo`
    Repo(RepoArgs),

    /// Summarize pull requests extracted under the data directory
    ///
    /// Examples: `crev sum pr myorg myrepo 123`, `crev sum pr . . .`
    Pr(PrArgs),
}

#[derive(Args)]
pub struct RepoArgs {
    /// Organization name ("." for all orgs)
    #[arg(value_name = "ORG")]
    pub org: Option<String>,

    /// Repository name ("." for all repos)
    #[arg(value_name = "REPO")]
    pub repo: Option<String>,

    /// Only collect and cache repo context without generating a summary
    #[arg(long)]
    pub context_only: bool,
}

#[derive(Args)]
pub struct PrArgs {
    /// Organization name ("." for all orgs)
    #[arg(value_name = "ORG")]
    pub org: Option<String>,

    /// Repository name ("." for all repos)
    #[arg(value_name = "REPO")]
    pub repo: Option<String>,

    /// Pull request number ("." for all PRs)
    #[arg(value_name = "PR_NUMBER", value_parser = parse_pr_selector)]
    pub pr: Option<Selector<u64>>,

    /// Only collect and cache PR context without generating a summary
    #[arg(long)]
    pub context_only: bool,
}

/// Fail on a missing prompt file before any unit runs.
fn preflight_prompts(ws: &Workspace, opts: RunOptions, prompts: &[&[Prompt]]) -> Result<()> {
    if opts.context_only {
        return Ok(());
    }
    for table in prompts {
        check_prompts(ws, table)?;
    }
    Ok(())
}

/// Build the model client unless the run never calls it.
fn client_for(ws: &Workspace, opts: RunOptions) -> Result<Option<Box<dyn LanguageModel>>> {
    if opts.context_only {
        return Ok(None);
    }
    Ok(Some(build_client(&ws.config().llm)?))
}

fn repo_batch(
    ws: &Workspace,
    units: &[RepoUnit],
    llm: Option<&dyn LanguageModel>,
    opts: RunOptions,
) -> Result<BatchSummary> {
    Ok(run_batch(units, |unit| summarize_repo(ws, &unit.org, &unit.name, llm, opts))?)
}

fn pr_batch(
    ws: &Workspace,
    units: &[PrUnit],
    llm: Option<&dyn LanguageModel>,
    opts: RunOptions,
) -> Result<BatchSummary> {
    Ok(run_batch(units, |unit| {
        summarize_pr(ws, &unit.org, &unit.name, unit.pr_number, llm, opts)
    })?)
}

pub fn run(args: SumArgs, workspace: &Path, config: Option<&Path>) -> Result<()> {
    let ws = Workspace::load(workspace, config)?;

    let summary = match args.target {
        None => {
            let opts = RunOptions { context_only: args.context_only };
            let repos = select_repos(ws.config(), &Selector::All, &Selector::All)?;
            let prs = select_prs(ws.config(), &Selector::All, &Selector::All, &Selector::All)?;
            preflight_prompts(&ws, opts, &[&REPO_PROMPTS[..], &PR_PROMPTS[..]])?;
            let llm = client_for(&ws, opts)?;

            println!("Running both 'repo' and 'pr' summarization for all orgs/repos/prs...");
            let mut summary = repo_batch(&ws, &repos, llm.as_deref(), opts)?;
            summary.merge(pr_batch(&ws, &prs, llm.as_deref(), opts)?);
            summary
        }
        Some(SumTarget::Repo(repo)) => {
            let opts = RunOptions { context_only: repo.context_only || args.context_only };
            let units = select_repos(
                ws.config(),
                &Selector::from_arg(repo.org.as_deref()),
                &Selector::from_arg(repo.repo.as_deref()),
            )?;
            preflight_prompts(&ws, opts, &[&REPO_PROMPTS[..]])?;
            let llm = client_for(&ws, opts)?;
            repo_batch(&ws, &units, llm.as_deref(), opts)?
        }
        Some(SumTarget::Pr(pr)) => {
            let opts = RunOptions { context_only: pr.context_only || args.context_only };
            let units = select_prs(
                ws.config(),
                &Selector::from_arg(pr.org.as_deref()),
                &Selector::from_arg(pr.repo.as_deref()),
                &pr.pr.unwrap_or_default(),
            )?;
            preflight_prompts(&ws, opts, &[&PR_PROMPTS[..]])?;
            let llm = client_for(&ws, opts)?;
            pr_batch(&ws, &units, llm.as_deref(), opts)?
        }
    };

    println!("{summary}");
    Ok(())
}
