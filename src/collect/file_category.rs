//! File listing handed to the categorization prompt.

use crate::utils::relative_display;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::fs;
use std::path::Path;

/// Directories and files that never reach the listing, gitignored or not.
const ALWAYS_IGNORED_DIRS: &[&str] = &[".git", "__pycache__", "node_modules", ".venv", "venv"];
const ALWAYS_IGNORED_FILES: &[&str] = &["*.pyc", "*.pyo", ".DS_Store"];

/// Number of `.gitignore` patterns echoed into the document.
const MAX_LISTED_PATTERNS: usize = 20;

fn always_ignored() -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for dir in ALWAYS_IGNORED_DIRS {
        for pattern in [dir.to_string(), format!("**/{dir}"), format!("**/{dir}/**")] {
            if let Ok(glob) = Glob::new(&pattern) {
                builder.add(glob);
            }
        }
    }
    for file in ALWAYS_IGNORED_FILES {
        for pattern in [file.to_string(), format!("**/{file}")] {
            if let Ok(glob) = Glob::new(&pattern) {
                builder.add(glob);
            }
        }
    }
    builder.build().unwrap_or_else(|_| GlobSet::empty())
}

/// Non-empty, non-comment lines of the repository's top-level `.gitignore`.
fn gitignore_patterns(repo_path: &Path) -> Vec<String> {
    let path = repo_path.join(".gitignore");
    if !path.is_file() {
        return Vec::new();
    }
    match fs::read_to_string(&path) {
        Ok(content) => content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect(),
        Err(e) => {
            tracing::warn!("Could not read {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Sorted repository-relative paths of every file that is not ignored.
pub fn list_repository_files(repo_path: &Path) -> Vec<String> {
    let ignored = always_ignored();
    let root = repo_path.to_path_buf();
    let filter_set = ignored.clone();

    let mut builder = WalkBuilder::new(repo_path);
    builder
        .hidden(false)
        .require_git(false)
        .git_global(false)
        .parents(false)
        .filter_entry(move |entry| match relative_display(entry.path(), &root) {
            Some(rel) if !rel.is_empty() => !filter_set.is_match(&rel),
            _ => true,
        });

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Error scanning {}: {}", repo_path.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        if let Some(rel) = relative_display(entry.path(), repo_path) {
            if !ignored.is_match(&rel) {
                files.push(rel);
            }
        }
    }
    files.sort();
    files
}

/// Render the categorization context document for `repo_path`.
pub fn collect_file_listing(repo_path: &Path) -> String {
    let patterns = gitignore_patterns(repo_path);
    let files = list_repository_files(repo_path);

    let mut parts = vec!["# Repository Files for Categorization\n".to_string()];

    if !patterns.is_empty() {
        parts.push("## .gitignore Patterns Applied\n".to_string());
        parts.push("```".to_string());
        let shown = patterns.len().min(MAX_LISTED_PATTERNS);
        parts.push(patterns[..shown].join("\n"));
        if patterns.len() > MAX_LISTED_PATTERNS {
            parts.push(format!("... and {} more patterns", patterns.len() - MAX_LISTED_PATTERNS));
        }
        parts.push("```\n".to_string());
    }

    parts.push("## Files to Categorize\n".to_string());
    parts.push("Please categorize each file as `test`, `app`, or `infra`.\n".to_string());
    parts.push("```".to_string());
    parts.extend(files.iter().cloned());
    parts.push("```\n".to_string());
    parts.push(format!("\nTotal files: {}", files.len()));

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_skips_always_ignored_and_gitignored_files() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(root, "src/main.rs");
        touch(root, "src/lib.rs");
        touch(root, "node_modules/pkg/index.js");
        touch(root, "pkg/__pycache__/mod.pyc");
        touch(root, "tool.pyc");
        touch(root, ".DS_Store");
        touch(root, "build/out.bin");
        touch(root, ".github/workflows/ci.yml");
        fs::write(root.join(".gitignore"), "# comment\nbuild/\n").unwrap();

        let files = list_repository_files(root);
        assert_eq!(
            files,
            vec![".github/workflows/ci.yml", ".gitignore", "src/lib.rs", "src/main.rs"]
        );
    }

    #[test]
    fn test_document_lists_patterns_and_total() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.py");
        fs::write(tmp.path().join(".gitignore"), "*.log\n").unwrap();

        let doc = collect_file_listing(tmp.path());
        assert!(doc.starts_with("# Repository Files for Categorization\n"));
        assert!(doc.contains("## .gitignore Patterns Applied\n\n```\n*.log\n```"));
        assert!(doc.contains("```\n.gitignore\na.py\n```"));
        assert!(doc.ends_with("\nTotal files: 2"));
    }

    #[test]
    fn test_long_gitignore_is_abbreviated() {
        let tmp = TempDir::new().unwrap();
        let patterns: Vec<String> = (0..25).map(|i| format!("ignored{i}.txt")).collect();
        fs::write(tmp.path().join(".gitignore"), patterns.join("\n")).unwrap();

        let doc = collect_file_listing(tmp.path());
        assert!(doc.contains("ignored19.txt"));
        assert!(!doc.contains("ignored20.txt\n"));
        assert!(doc.contains("... and 5 more patterns"));
    }
}
