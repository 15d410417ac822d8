//! Artifact filename templates.
//!
//! Templates use `{name}` placeholders; `{{` and `}}` produce literal braces.
//! Rendering is pure, so the same stage and arguments always resolve to the
//! same filename.

use crate::errors::{CrevError, CrevResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt::Display;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|\{|\}").unwrap());

/// Run-specific parameters substituted into filename templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatArgs(BTreeMap<String, String>);

impl FormatArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Display) {
        self.0.insert(name.into(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

/// Substitute every placeholder in `template`.
///
/// Fails with [`CrevError::Template`] when a placeholder names an argument
/// that was not supplied, or when braces are unbalanced.
pub fn render_template(template: &str, args: &FormatArgs) -> CrevResult<String> {
    let fail = |reason: String| CrevError::Template { template: template.to_string(), reason };

    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&template[last..whole.start()]);
        last = whole.end();

        match whole.as_str() {
            "{{" => out.push('{'),
            "}}" => out.push('}'),
            "{" | "}" => return Err(fail(format!("unbalanced brace at byte {}", whole.start()))),
            _ => {
                let name = caps.get(1).map_or("", |m| m.as_str()).trim();
                if name.is_empty() {
                    return Err(fail("empty placeholder".to_string()));
                }
                let value = args
                    .get(name)
                    .ok_or_else(|| fail(format!("missing format argument `{name}`")))?;
                out.push_str(value);
            }
        }
    }
    out.push_str(&template[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_named_placeholders() {
        let args = FormatArgs::new().with("commit_count", 17).with("short_hash", "abc1234567");
        let name = render_template("sum.repo.{commit_count}.{short_hash}.ai.md", &args)
            .expect("render");
        assert_eq!(name, "sum.repo.17.abc1234567.ai.md");
    }

    #[test]
    fn test_template_without_placeholders_is_returned_verbatim() {
        let name = render_template("sum_repo.structure.md", &FormatArgs::new()).expect("render");
        assert_eq!(name, "sum_repo.structure.md");
    }

    #[test]
    fn test_missing_argument_is_a_template_error() {
        let err = render_template("sum.pr.{pr_number}.ai.md", &FormatArgs::new())
            .expect_err("must fail");
        match err {
            CrevError::Template { template, reason } => {
                assert_eq!(template, "sum.pr.{pr_number}.ai.md");
                assert!(reason.contains("pr_number"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_doubled_braces_are_literal() {
        let args = FormatArgs::new().with("pr_number", 7);
        let name = render_template("{{raw}}.{pr_number}", &args).expect("render");
        assert_eq!(name, "{raw}.7");
    }

    #[test]
    fn test_unbalanced_braces_are_rejected() {
        let args = FormatArgs::new().with("a", 1);
        assert!(render_template("x.{a", &args).is_err());
        assert!(render_template("x.a}", &args).is_err());
        assert!(render_template("x.{}", &args).is_err());
    }
}
