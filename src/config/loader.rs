//! Config file loading

use crate::domain::Config;
use crate::errors::{CrevError, CrevResult};
use std::fs;
use std::path::{Path, PathBuf};

const CANDIDATES: [&str; 4] = ["configs.json", "configs.toml", "configs.yaml", "configs.yml"];

/// Load the workspace configuration.
///
/// An explicit `config_path` is resolved against `workspace_root` when relative.
/// Without one, the first existing candidate in the workspace root is used.
/// A workspace without any config file is a configuration error.
pub fn load_config(workspace_root: &Path, config_path: Option<&Path>) -> CrevResult<Config> {
    let config_file = match config_path {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => workspace_root.join(path),
        None => discover_config(workspace_root).ok_or_else(|| {
            CrevError::Configuration(format!(
                "configs.json not found in {}. Create a workspace config first.",
                workspace_root.display()
            ))
        })?,
    };

    if !config_file.is_file() {
        return Err(CrevError::Configuration(format!(
            "Config file not found: {}",
            config_file.display()
        )));
    }

    let content = fs::read_to_string(&config_file).map_err(|e| {
        CrevError::Configuration(format!(
            "Failed reading config file {}: {e}",
            config_file.display()
        ))
    })?;

    let ext = config_file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "json" => serde_json::from_str(&content).map_err(|e| e.to_string()),
        "toml" => toml::from_str(&content).map_err(|e| e.to_string()),
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
        other => {
            return Err(CrevError::Configuration(format!(
                "Unsupported config extension '.{}' for file {}",
                other,
                config_file.display()
            )))
        }
    };

    let config: Config = parsed.map_err(|e| {
        CrevError::Configuration(format!("Invalid config {}: {e}", config_file.display()))
    })?;

    tracing::debug!(
        "Loaded config {} ({} repos)",
        config_file.display(),
        config.repos.len()
    );
    Ok(config)
}

fn discover_config(workspace_root: &Path) -> Option<PathBuf> {
    CANDIDATES.iter().map(|candidate| workspace_root.join(candidate)).find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_configuration_error() {
        let tmp = TempDir::new().expect("tmp");
        let err = load_config(tmp.path(), None).expect_err("must fail");
        assert!(err.is_fatal());
        assert!(err.to_string().contains("configs.json not found"));
    }

    #[test]
    fn test_load_json_config() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(
            tmp.path().join("configs.json"),
            r#"{
                "repos": [{"org": "acme", "name": "api", "pull_requests": [1, 2]}],
                "cache_files": {"sum_pr": {"output": "pr-{pr_number}.md"}}
            }"#,
        )
        .expect("write");

        let cfg = load_config(tmp.path(), None).expect("config");
        assert_eq!(cfg.repos.len(), 1);
        assert_eq!(cfg.repos[0].pull_requests.len(), 2);
        assert_eq!(cfg.cache_files.sum_pr.get("output").map(String::as_str), Some("pr-{pr_number}.md"));
    }

    #[test]
    fn test_load_toml_config() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(
            tmp.path().join("configs.toml"),
            "[[repos]]\norg = 'acme'\nname = 'web'\n\n[paths]\ndata = 'out'\nrepos = 'checkouts'\n",
        )
        .expect("write");

        let cfg = load_config(tmp.path(), None).expect("config");
        assert_eq!(cfg.repos[0].name.as_deref(), Some("web"));
        assert_eq!(cfg.paths.data, PathBuf::from("out"));
    }

    #[test]
    fn test_json_wins_over_yaml_when_both_exist() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("configs.json"), r#"{"repos": []}"#).expect("write json");
        fs::write(tmp.path().join("configs.yaml"), "repos:\n  - org: a\n    name: b\n")
            .expect("write yaml");

        let cfg = load_config(tmp.path(), None).expect("config");
        assert!(cfg.repos.is_empty());
    }

    #[test]
    fn test_explicit_relative_path_resolves_against_workspace() {
        let tmp = TempDir::new().expect("tmp");
        fs::create_dir_all(tmp.path().join("conf")).expect("mkdir");
        fs::write(tmp.path().join("conf/crev.yml"), "llm:\n  model: test-model\n").expect("write");

        let cfg = load_config(tmp.path(), Some(Path::new("conf/crev.yml"))).expect("config");
        assert_eq!(cfg.llm.model, "test-model");
    }

    #[test]
    fn test_invalid_json_is_configuration_error() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("configs.json"), "{ not json").expect("write");

        let err = load_config(tmp.path(), None).expect_err("must fail");
        assert!(matches!(err, CrevError::Configuration(_)));
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("configs.ini");
        fs::write(&path, "x=1").expect("write");

        let err = load_config(tmp.path(), Some(&path)).expect_err("must fail");
        assert!(err.to_string().contains("Unsupported config extension"));
    }
}
