//! Pass/fail accounting for a conformance run.

use std::process::ExitCode;

use serde::Serialize;

/// Highest exit status a failure count maps to; 255 is left for aborted runs.
pub const MAX_FAILURE_STATUS: u8 = 254;

/// Terminal state of a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    Failed,
}

/// Outcome of a single test case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseOutcome {
    pub name: String,
    pub verdict: Verdict,
    /// Numeric code of the error that failed the case, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

impl CaseOutcome {
    pub fn passed(name: &str) -> Self {
        Self {
            name: name.to_string(),
            verdict: Verdict::Passed,
            error_code: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn failed(name: &str, error_code: i32, diagnostics: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            verdict: Verdict::Failed,
            error_code: Some(error_code),
            diagnostics,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.verdict == Verdict::Passed
    }
}

/// Running totals plus every outcome, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConformanceReport {
    pub passed: usize,
    pub failed: usize,
    pub outcomes: Vec<CaseOutcome>,
}

impl ConformanceReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: CaseOutcome) {
        match outcome.verdict {
            Verdict::Passed => self.passed += 1,
            Verdict::Failed => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    /// No failures and at least one executed case.
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.passed > 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_passed())
    }

    /// Failure count as a process exit code, clamped to [`MAX_FAILURE_STATUS`].
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    pub fn exit_status(&self) -> u8 {
        u8::try_from(self.failed)
            .unwrap_or(MAX_FAILURE_STATUS)
            .min(MAX_FAILURE_STATUS)
    }

    /// Human-readable report: per-failure diagnostics, then the totals.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for outcome in self.failures() {
            lines.push(format!("FAILED {}", outcome.name));
            lines.extend(outcome.diagnostics.iter().map(|line| format!("  {line}")));
        }
        lines.push(format!("passed: {}", self.passed));
        lines.push(format!("failed: {}", self.failed));
        if self.is_success() {
            lines.push("SUCCESS".to_string());
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_follow_recorded_verdicts() {
        let mut report = ConformanceReport::new();
        report.record(CaseOutcome::passed("a"));
        report.record(CaseOutcome::failed("b", 3007, vec!["x expected: 1 actual: 2".into()]));
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.total(), 2);
        assert!(!report.is_success());
        assert_eq!(report.exit_status(), 1);
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn empty_run_is_not_a_success() {
        let report = ConformanceReport::new();
        assert!(!report.is_success());
        assert_eq!(report.exit_status(), 0);
        assert!(!report.summary_lines().contains(&"SUCCESS".to_string()));
    }

    #[test]
    fn summary_lists_failures_then_totals() {
        let mut report = ConformanceReport::new();
        report.record(CaseOutcome::failed("b", 3004, vec!["method not found".into()]));
        assert_eq!(
            report.summary_lines(),
            vec![
                "FAILED b".to_string(),
                "  method not found".to_string(),
                "passed: 0".to_string(),
                "failed: 1".to_string(),
            ]
        );
    }

    #[test]
    fn exit_status_is_clamped() {
        let report = ConformanceReport {
            passed: 0,
            failed: 300,
            outcomes: Vec::new(),
        };
        assert_eq!(report.exit_status(), MAX_FAILURE_STATUS);

        let report = ConformanceReport {
            passed: 0,
            failed: 255,
            outcomes: Vec::new(),
        };
        assert_eq!(report.exit_status(), 254);

        let report = ConformanceReport {
            passed: 0,
            failed: 254,
            outcomes: Vec::new(),
        };
        assert_eq!(report.exit_status(), 254);
    }

    #[test]
    fn serializes_outcomes_without_empty_fields() {
        let mut report = ConformanceReport::new();
        report.record(CaseOutcome::passed("a"));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "passed": 1,
                "failed": 0,
                "outcomes": [{"name": "a", "verdict": "passed"}]
            })
        );
    }
}
