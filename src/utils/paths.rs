//! Path normalization

use std::path::Path;

pub fn normalize_path(path: &str) -> String {
    // Convert backslashes to forward slashes and normalize
    path.replace('\\', "/")
}

/// `path` relative to `root` with forward slashes, or `None` when it lies outside.
pub fn relative_display(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(normalize_path(rel.to_string_lossy().as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_display_uses_forward_slashes() {
        let root = Path::new("/repo");
        assert_eq!(
            relative_display(Path::new("/repo/src/main.rs"), root).as_deref(),
            Some("src/main.rs")
        );
        assert_eq!(relative_display(Path::new("/elsewhere/x"), root), None);
    }
}
