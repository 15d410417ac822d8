//! Context documents for the structure and per-category stages.

use crate::domain::{Category, FileCategories};
use crate::utils::{is_binary_file, read_file_safe};
use std::collections::BTreeMap;
use std::path::{Component, Path};

/// Lines of a single file kept in a category context.
pub const MAX_FILE_LINES: usize = 500;

/// Fence language for a file path, falling back to the bare extension.
fn fence_language(rel_path: &str) -> &str {
    let ext = Path::new(rel_path).extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "py" => "python",
        "js" => "javascript",
        "ts" => "typescript",
        "rb" => "ruby",
        "rs" => "rust",
        "kt" => "kotlin",
        "cs" => "csharp",
        "h" => "c",
        "hpp" => "cpp",
        "yml" => "yaml",
        "md" => "markdown",
        "sh" | "zsh" => "bash",
        other => other,
    }
}

/// Paths coming back from the model are only trusted when they stay inside the
/// repository.
fn is_contained(rel_path: &str) -> bool {
    Path::new(rel_path).components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn file_body(path: &Path) -> String {
    if is_binary_file(path) {
        return "[Binary file omitted]".to_string();
    }
    match read_file_safe(path) {
        Ok(content) => {
            let lines: Vec<&str> = content.lines().collect();
            if lines.len() > MAX_FILE_LINES {
                format!(
                    "{}\n\n... [truncated, {} more lines]",
                    lines[..MAX_FILE_LINES].join("\n"),
                    lines.len() - MAX_FILE_LINES
                )
            } else {
                content
            }
        }
        Err(e) => format!("[Error reading file: {e:#}]"),
    }
}

/// Render the files of one category with their contents.
pub fn collect_category_context(
    repo_path: &Path,
    file_paths: &[String],
    category: Option<Category>,
) -> String {
    let mut parts = Vec::new();
    match category {
        Some(category) => parts.push(format!("# {} Files\n", category.title())),
        None => parts.push("# Repository Files\n".to_string()),
    }

    let mut sorted: Vec<&String> = file_paths.iter().collect();
    sorted.sort();

    for rel_path in sorted {
        parts.push(format!("## {rel_path}\n"));
        let path = repo_path.join(rel_path);
        if is_contained(rel_path) && path.is_file() {
            parts.push(format!("```{}", fence_language(rel_path)));
            parts.push(file_body(&path));
            parts.push("```\n".to_string());
        } else {
            parts.push("*File not found*\n".to_string());
        }
    }

    parts.push(format!("\nTotal files: {}", file_paths.len()));
    parts.join("\n")
}

/// Render the directory layout of every category.
pub fn collect_structure_context(categories: &FileCategories) -> String {
    let mut parts = vec!["# Repository File Organization\n".to_string()];

    for category in Category::ALL {
        let files = categories.files(category);
        parts.push(format!("## {} Files ({} files)\n", category.title(), files.len()));

        if files.is_empty() {
            parts.push("*No files in this category*\n".to_string());
            continue;
        }

        let mut dirs: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for file in files {
            let path = Path::new(file);
            let dir = match path.parent().map(|p| p.to_string_lossy().into_owned()) {
                Some(dir) if !dir.is_empty() && dir != "." => dir,
                _ => "(root)".to_string(),
            };
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.clone());
            dirs.entry(dir).or_default().push(name);
        }

        for (dir, mut names) in dirs {
            names.sort();
            parts.push(format!("### {dir}/"));
            parts.extend(names.into_iter().map(|name| format!("- {name}")));
            parts.push(String::new());
        }
    }

    parts.push(format!("\n**Total files:** {}", categories.total()));
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_category_context_fences_and_truncates() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/main.rs"), "fn main() {}\n").unwrap();
        let long: String = (0..MAX_FILE_LINES + 3).map(|i| format!("line {i}\n")).collect();
        fs::write(tmp.path().join("big.py"), long).unwrap();

        let files = vec!["src/main.rs".to_string(), "big.py".to_string(), "gone.txt".to_string()];
        let doc = collect_category_context(tmp.path(), &files, Some(Category::App));

        assert!(doc.starts_with("# App Files\n"));
        assert!(doc.contains("## src/main.rs\n\n```rust\nfn main() {}\n"));
        assert!(doc.contains("```python\n"));
        assert!(doc.contains("... [truncated, 3 more lines]"));
        assert!(!doc.contains(&format!("line {MAX_FILE_LINES}\n")));
        assert!(doc.contains("## gone.txt\n\n*File not found*"));
        assert!(doc.ends_with("\nTotal files: 3"));
        // sorted by path
        assert!(doc.find("## big.py").unwrap() < doc.find("## gone.txt").unwrap());
    }

    #[test]
    fn test_escaping_paths_are_not_read() {
        let tmp = TempDir::new().unwrap();
        let repo = tmp.path().join("repo");
        fs::create_dir_all(&repo).unwrap();
        fs::write(tmp.path().join("secret.txt"), "hunter2").unwrap();

        let doc = collect_category_context(&repo, &["../secret.txt".to_string()], None);
        assert!(doc.starts_with("# Repository Files\n"));
        assert!(!doc.contains("hunter2"));
        assert!(doc.contains("*File not found*"));
    }

    #[test]
    fn test_binary_files_are_omitted() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("logo.png"), [0x89, b'P', b'N', b'G', 0x00, 0x01]).unwrap();

        let doc = collect_category_context(tmp.path(), &["logo.png".to_string()], None);
        assert!(doc.contains("```png\n[Binary file omitted]\n```"));
    }

    #[test]
    fn test_structure_groups_by_directory() {
        let categories = FileCategories {
            app: vec!["src/b.rs".into(), "src/a.rs".into(), "main.rs".into()],
            test: vec![],
            infra: vec!["Dockerfile".into()],
        };
        let doc = collect_structure_context(&categories);

        assert!(doc.contains("## App Files (3 files)\n\n### (root)/\n- main.rs\n\n### src/\n- a.rs\n- b.rs\n"));
        assert!(doc.contains("## Test Files (0 files)\n\n*No files in this category*\n"));
        assert!(doc.contains("## Infra Files (1 files)\n"));
        assert!(doc.ends_with("\n**Total files:** 4"));
    }
}
