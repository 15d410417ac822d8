//! Repository version lookup used to name the combined report.

use anyhow::{Context, Result};
use git2::Repository;
use std::path::Path;

const SHORT_HASH_LEN: usize = 10;

/// Commit count reachable from HEAD and the abbreviated HEAD hash.
///
/// Falls back to `(0, "unknown")` with a warning when the checkout cannot be
/// read, so a repository without history still gets summarized.
pub fn version_info(repo_path: &Path) -> (usize, String) {
    match read_version_info(repo_path) {
        Ok(info) => info,
        Err(e) => {
            tracing::warn!("Could not get git version info for {}: {:#}", repo_path.display(), e);
            (0, "unknown".to_string())
        }
    }
}

fn read_version_info(repo_path: &Path) -> Result<(usize, String)> {
    let repo = Repository::open(repo_path)
        .with_context(|| format!("Not a git repository: {}", repo_path.display()))?;
    let head = repo.head().context("Repository has no HEAD")?;
    let commit = head.peel_to_commit().context("HEAD does not point at a commit")?;

    let mut walk = repo.revwalk()?;
    walk.push(commit.id())?;
    let count = walk.try_fold(0usize, |n, oid| oid.map(|_| n + 1))?;

    let full = commit.id().to_string();
    Ok((count, full[..SHORT_HASH_LEN.min(full.len())].to_string()))
}
