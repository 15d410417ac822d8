//! Unit selection and the batch driver.
//!
//! Units are resolved from the configured repositories, then run one after
//! another. A failing unit never stops the batch; only configuration errors do.

use crate::cache::{OutcomeKind, StageReport};
use crate::domain::Config;
use crate::errors::{CrevError, CrevResult};
use std::fmt;

/// A positional filter: a concrete value, or `.`/absent for everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selector<T> {
    #[default]
    All,
    Exact(T),
}

impl Selector<String> {
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None | Some(".") => Selector::All,
            Some(value) => Selector::Exact(value.to_string()),
        }
    }
}

impl<T: PartialEq> Selector<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selector::All => true,
            Selector::Exact(expected) => expected == value,
        }
    }

    pub fn exact(&self) -> Option<&T> {
        match self {
            Selector::All => None,
            Selector::Exact(value) => Some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoUnit {
    pub org: String,
    pub name: String,
}

impl fmt::Display for RepoUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.org, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrUnit {
    pub org: String,
    pub name: String,
    pub pr_number: u64,
}

impl fmt::Display for PrUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.org, self.name, self.pr_number)
    }
}

/// Configured repositories matching both filters, in configuration order.
///
/// A filter that matches nothing is a configuration error. Entries without
/// `org` or `name` are reported and left out.
pub fn select_repos(
    config: &Config,
    org: &Selector<String>,
    repo: &Selector<String>,
) -> CrevResult<Vec<RepoUnit>> {
    let by_org: Vec<_> = config
        .repos
        .iter()
        .filter(|entry| match org.exact() {
            Some(expected) => entry.org.as_deref() == Some(expected.as_str()),
            None => true,
        })
        .collect();
    if let Some(expected) = org.exact() {
        if by_org.is_empty() {
            return Err(CrevError::Configuration(format!(
                "Organization '{expected}' not found in configuration"
            )));
        }
    }

    let by_name: Vec<_> = by_org
        .into_iter()
        .filter(|entry| match repo.exact() {
            Some(expected) => entry.name.as_deref() == Some(expected.as_str()),
            None => true,
        })
        .collect();
    if let Some(expected) = repo.exact() {
        if by_name.is_empty() {
            let scope = org.exact().map(|o| format!(" in org '{o}'")).unwrap_or_default();
            return Err(CrevError::Configuration(format!(
                "Repository '{expected}' not found{scope} in configuration"
            )));
        }
    }

    let mut units = Vec::with_capacity(by_name.len());
    for entry in by_name {
        match (&entry.org, &entry.name) {
            (Some(org), Some(name)) if !org.is_empty() && !name.is_empty() => {
                units.push(RepoUnit { org: org.clone(), name: name.clone() });
            }
            _ => tracing::warn!("Skipping invalid repo entry (missing name or org)"),
        }
    }
    Ok(units)
}

/// Pull requests of the selected repositories.
///
/// An exact PR number that no selected repository lists is a configuration
/// error. Non-integer entries in `pull_requests` are reported and skipped.
pub fn select_prs(
    config: &Config,
    org: &Selector<String>,
    repo: &Selector<String>,
    pr: &Selector<u64>,
) -> CrevResult<Vec<PrUnit>> {
    let mut units = Vec::new();
    for unit in select_repos(config, org, repo)? {
        let entry = config
            .repos
            .iter()
            .find(|e| {
                e.org.as_deref() == Some(unit.org.as_str())
                    && e.name.as_deref() == Some(unit.name.as_str())
            });
        let Some(entry) = entry else { continue };

        for value in &entry.pull_requests {
            let Some(number) = value.as_u64() else {
                tracing::warn!("Skipping invalid PR number in {}: {}", unit, value);
                continue;
            };
            if pr.matches(&number) {
                units.push(PrUnit { org: unit.org.clone(), name: unit.name.clone(), pr_number: number });
            }
        }
    }

    if let Some(number) = pr.exact() {
        if units.is_empty() {
            let scope = repo.exact().map(|r| format!(" for repo '{r}'")).unwrap_or_default();
            return Err(CrevError::Configuration(format!(
                "PR #{number} not found in configuration{scope}"
            )));
        }
    }
    Ok(units)
}

/// Unit tallies of one or more batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn merge(&mut self, other: BatchSummary) {
        self.succeeded += other.succeeded;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Done: {} succeeded, {} skipped, {} failed.",
            self.succeeded, self.skipped, self.failed
        )
    }
}

/// Run every unit to completion.
///
/// Missing inputs count as skipped and any other unit error as failed; both
/// are logged and the batch moves on. A configuration error aborts the batch.
pub fn run_batch<U, F>(units: &[U], mut run_unit: F) -> CrevResult<BatchSummary>
where
    U: fmt::Display,
    F: FnMut(&U) -> CrevResult<StageReport>,
{
    let mut summary = BatchSummary::default();
    for unit in units {
        match run_unit(unit) {
            Ok(report) => {
                tracing::debug!(
                    "{}: {} computed, {} cached, {} skipped",
                    unit,
                    report.count(OutcomeKind::Computed),
                    report.count(OutcomeKind::Cached),
                    report.count(OutcomeKind::Skipped)
                );
                summary.succeeded += 1;
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e @ CrevError::UnitPrecondition { .. }) => {
                tracing::warn!("Skipping {}: {}", unit, e);
                summary.skipped += 1;
            }
            Err(e) => {
                tracing::error!("{} failed: {}", unit, e);
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        serde_json::from_str(
            r#"{"repos": [
                {"org": "acme", "name": "api", "pull_requests": [1, 2, "x"]},
                {"org": "acme", "name": "web", "pull_requests": [7]},
                {"org": "globex", "name": "api"},
                {"name": "orphan"}
            ]}"#,
        )
        .expect("config")
    }

    fn all() -> Selector<String> {
        Selector::All
    }

    #[test]
    fn test_dot_means_all() {
        assert_eq!(Selector::from_arg(Some(".")), Selector::All);
        assert_eq!(Selector::from_arg(None), Selector::All);
        assert_eq!(Selector::from_arg(Some("acme")), Selector::Exact("acme".to_string()));
    }

    #[test]
    fn test_repo_selection_filters_and_skips_invalid_entries() {
        let cfg = config();
        let units = select_repos(&cfg, &all(), &all()).expect("all");
        assert_eq!(units.len(), 3);

        let api = select_repos(&cfg, &all(), &Selector::from_arg(Some("api"))).expect("api");
        let names: Vec<_> = api.iter().map(|u| u.to_string()).collect();
        assert_eq!(names, ["acme/api", "globex/api"]);
    }

    #[test]
    fn test_unknown_org_or_repo_is_fatal() {
        let cfg = config();
        let err = select_repos(&cfg, &Selector::from_arg(Some("nope")), &all()).expect_err("org");
        assert!(err.is_fatal());
        let err = select_repos(&cfg, &Selector::from_arg(Some("globex")), &Selector::from_arg(Some("web")))
            .expect_err("repo");
        assert!(err.to_string().contains("in org 'globex'"));
    }

    #[test]
    fn test_pr_selection() {
        let cfg = config();
        let units = select_prs(&cfg, &all(), &all(), &Selector::All).expect("all");
        let labels: Vec<_> = units.iter().map(|u| u.to_string()).collect();
        assert_eq!(labels, ["acme/api#1", "acme/api#2", "acme/web#7"]);

        let one = select_prs(&cfg, &all(), &Selector::from_arg(Some("api")), &Selector::Exact(2))
            .expect("one");
        assert_eq!(one, vec![PrUnit { org: "acme".into(), name: "api".into(), pr_number: 2 }]);

        let err = select_prs(&cfg, &all(), &Selector::from_arg(Some("web")), &Selector::Exact(2))
            .expect_err("unlisted");
        assert!(err.is_fatal());
    }

    #[test]
    fn test_batch_isolates_unit_failures() {
        let units = ["ok", "missing", "broken", "ok"];
        let summary = run_batch(&units, |unit| match *unit {
            "missing" => Err(CrevError::UnitPrecondition { message: "gone".into(), path: "x".into() }),
            "broken" => Err(CrevError::producer("output", "llm down")),
            _ => Ok(StageReport::default()),
        })
        .expect("batch");

        assert_eq!(summary, BatchSummary { succeeded: 2, skipped: 1, failed: 1 });
        assert_eq!(summary.to_string(), "Done: 2 succeeded, 1 skipped, 1 failed.");
    }

    #[test]
    fn test_configuration_error_aborts_batch() {
        let mut seen = 0;
        let result = run_batch(&["a", "b"], |_| {
            seen += 1;
            Err(CrevError::Configuration("no prompt".into()))
        });
        assert!(result.is_err());
        assert_eq!(seen, 1);
    }
}
