//! Context document for a pull request summary.

use crate::utils::{read_file_safe, relative_display};
use std::collections::BTreeSet;
use std::path::Path;
use walkdir::WalkDir;

fn files_under(dir: &Path) -> Vec<String> {
    if !dir.is_dir() {
        return Vec::new();
    }
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| relative_display(entry.path(), dir))
        .collect()
}

fn push_version(parts: &mut Vec<String>, heading: &str, path: &Path, absent: &str) {
    parts.push(format!("#### {heading}\n"));
    if path.is_file() {
        parts.push("```".to_string());
        match read_file_safe(path) {
            Ok(content) => parts.push(content),
            Err(e) => parts.push(format!("[Error reading file: {e:#}]")),
        }
        parts.push("```\n".to_string());
    } else {
        parts.push(format!("*{absent}*\n"));
    }
}

/// Render the diff and the before/after contents of every changed file.
///
/// Reads `sum/diff.txt` and the `code/initial` and `code/final` trees of the
/// PR directory. A missing diff is logged and left out.
pub fn collect_pr_context(pr_dir: &Path) -> String {
    let mut parts = vec!["# Attachments\n".to_string()];

    let diff_file = pr_dir.join("sum").join("diff.txt");
    if diff_file.is_file() {
        parts.push("## Git Diff\n".to_string());
        parts.push("```diff".to_string());
        match read_file_safe(&diff_file) {
            Ok(diff) => parts.push(diff),
            Err(e) => parts.push(format!("[Error reading file: {e:#}]")),
        }
        parts.push("```\n".to_string());
    } else {
        tracing::warn!("diff.txt not found in {}", pr_dir.display());
    }

    let code_dir = pr_dir.join("code");
    if code_dir.is_dir() {
        parts.push("## File Changes\n".to_string());
        let initial_dir = code_dir.join("initial");
        let final_dir = code_dir.join("final");

        let changed: BTreeSet<String> =
            files_under(&initial_dir).into_iter().chain(files_under(&final_dir)).collect();

        for rel in &changed {
            parts.push(format!("### {rel}\n"));
            push_version(&mut parts, "Initial", &initial_dir.join(rel), "File did not exist (newly added)");
            push_version(&mut parts, "Final", &final_dir.join(rel), "File was deleted");
        }
    }

    parts.join("\n")
}
