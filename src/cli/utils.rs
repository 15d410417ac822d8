//! Shared CLI utilities.

use crate::batch::Selector;

/// Parse a PR selector: a pull request number, or `.` for every PR.
pub fn parse_pr_selector(value: &str) -> Result<Selector<u64>, String> {
    if value == "." {
        return Ok(Selector::All);
    }
    value
        .parse::<u64>()
        .map(Selector::Exact)
        .map_err(|_| format!("PR_NUMBER must be an integer or '.', got '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pr_selector_accepts_number_or_dot() {
        assert_eq!(parse_pr_selector("42"), Ok(Selector::Exact(42)));
        assert_eq!(parse_pr_selector("."), Ok(Selector::All));
        assert!(parse_pr_selector("abc").unwrap_err().contains("'abc'"));
        assert!(parse_pr_selector("-1").is_err());
    }
}
