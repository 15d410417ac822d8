//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use crev::llm::LanguageModel;
use crev::Workspace;
use git2::{Repository, Signature};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const CATEGORIES_REPLY: &str = r#"Sure, here is the categorization:
```json
{"app": ["src/lib.rs", "src/main.rs"], "test": [], "infra": ["Dockerfile"]}
```"#;

/// Model double that answers by prompt tag and records every prompt.
///
/// Prompt files start with a tag (`CATEGORIZE`, `STRUCTURE`, `APP`, `TEST`,
/// `INFRA`, `PR`) so the first word of a prompt identifies the stage.
pub struct FakeModel {
    prompts: RefCell<Vec<String>>,
    categorization: String,
    fail_on: Option<&'static str>,
    empty_on: Option<&'static str>,
}

impl FakeModel {
    pub fn new() -> Self {
        Self::with_categorization(CATEGORIES_REPLY)
    }

    pub fn with_categorization(reply: &str) -> Self {
        Self {
            prompts: RefCell::new(Vec::new()),
            categorization: reply.to_string(),
            fail_on: None,
            empty_on: None,
        }
    }

    pub fn failing_on(tag: &'static str) -> Self {
        Self { fail_on: Some(tag), ..Self::new() }
    }

    /// Reply with an empty string to prompts tagged `tag`.
    pub fn empty_on(mut self, tag: &'static str) -> Self {
        self.empty_on = Some(tag);
        self
    }

    pub fn calls(&self) -> usize {
        self.prompts.borrow().len()
    }

    pub fn tags(&self) -> Vec<String> {
        self.prompts.borrow().iter().map(|p| tag_of(p).to_string()).collect()
    }

    pub fn prompt(&self, index: usize) -> String {
        self.prompts.borrow()[index].clone()
    }
}

fn tag_of(prompt: &str) -> &str {
    prompt.split_whitespace().next().unwrap_or("")
}

impl LanguageModel for FakeModel {
    fn invoke(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        let tag = tag_of(prompt);
        if self.fail_on == Some(tag) {
            anyhow::bail!("model unavailable for {tag}");
        }
        if self.empty_on == Some(tag) {
            return Ok(String::new());
        }
        Ok(match tag {
            "CATEGORIZE" => self.categorization.clone(),
            "STRUCTURE" => "Structure summary".to_string(),
            "APP" => "App summary".to_string(),
            "TEST" => "Test summary".to_string(),
            "INFRA" => "Infra summary".to_string(),
            "PR" => "PR summary".to_string(),
            other => format!("unexpected prompt tag {other}"),
        })
    }
}

/// A workspace with one configured repository `acme/api` (PR 42), its git
/// checkout, the prompt files and the extracted PR inputs.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(
            r#"{
                "llm": {"provider": "claude", "model": "test-model"},
                "repos": [{"org": "acme", "name": "api", "pull_requests": [42]}]
            }"#,
        )
    }

    pub fn with_config(config: &str) -> Self {
        let fixture = Self { dir: TempDir::new().expect("tmp") };
        fixture.write("configs.json", config);
        fixture.write_prompts();
        fixture.init_repo();
        fixture.write_pr_inputs();
        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, rel: &str, content: &str) {
        let path = self.root().join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, content).expect("write");
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::load(self.root(), None).expect("workspace")
    }

    pub fn repo_path(&self) -> PathBuf {
        self.root().join("repos/acme/api")
    }

    pub fn sum_dir(&self) -> PathBuf {
        self.root().join("data/acme/api/sum")
    }

    pub fn pr_dir(&self) -> PathBuf {
        self.root().join("data/acme/api/42")
    }

    /// Filename of the combined repository report.
    pub fn output_name(&self) -> String {
        let (count, hash) = crev::git::version_info(&self.repo_path());
        format!("sum.repo.{count}.{hash}.ai.md")
    }

    /// Sorted names of the files in `dir`.
    pub fn files_in(&self, dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = match fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_file())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }

    pub fn remove_prompts(&self) {
        fs::remove_dir_all(self.root().join("prompts")).expect("remove prompts");
    }

    fn write_prompts(&self) {
        self.write("prompts/sum_repo_file_category.txt", "CATEGORIZE the files below.");
        self.write("prompts/sum_repo_structure.txt", "STRUCTURE of the repository.");
        self.write("prompts/sum_repo_app.txt", "APP code analysis.");
        self.write("prompts/sum_repo_test.txt", "TEST code analysis.");
        self.write("prompts/sum_repo_infra.txt", "INFRA analysis.");
        self.write("prompts/sum.pr.txt", "PR summary request.");
    }

    fn init_repo(&self) {
        self.write("repos/acme/api/src/main.rs", "fn main() {\n    api::serve();\n}\n");
        self.write("repos/acme/api/src/lib.rs", "pub fn serve() {}\n");
        self.write("repos/acme/api/Dockerfile", "FROM rust:1.80\n");

        let repo = Repository::init(self.repo_path()).expect("git init");
        let mut index = repo.index().expect("index");
        for rel in ["src/main.rs", "src/lib.rs", "Dockerfile"] {
            index.add_path(Path::new(rel)).expect("add");
        }
        index.write().expect("index write");
        let tree = repo.find_tree(index.write_tree().expect("tree")).expect("find tree");
        let sig = Signature::now("Test", "test@example.com").expect("signature");
        repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[]).expect("commit");
    }

    fn write_pr_inputs(&self) {
        self.write("data/acme/api/42/sum/diff.txt", "-pub fn serve() {}\n+pub fn serve() -> u16 { 8080 }");
        self.write("data/acme/api/42/code/initial/src/lib.rs", "pub fn serve() {}\n");
        self.write("data/acme/api/42/code/final/src/lib.rs", "pub fn serve() -> u16 { 8080 }\n");
        self.write("data/acme/api/42/code/final/src/port.rs", "pub const PORT: u16 = 8080;\n");
    }
}
