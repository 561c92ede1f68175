//! Smoke test results

use std::fmt;

/// Outcome of one smoke test step
#[derive(Debug, Clone, PartialEq)]
pub struct TestStepResult {
    pub step_name: String,
    pub passed: bool,
    pub detail: String,
}

impl TestStepResult {
    pub fn pass(step_name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            passed: true,
            detail: detail.into(),
        }
    }

    pub fn fail(step_name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            passed: false,
            detail: detail.into(),
        }
    }
}

/// One of the top results returned by the ask endpoint, for display only
#[derive(Debug, Clone, PartialEq)]
pub struct NewsHighlight {
    pub title: String,
    pub similarity_percent: f64,
    pub critical: bool,
}

impl fmt::Display for NewsHighlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1}%)", self.title, self.similarity_percent)?;
        if self.critical {
            write!(f, " [critical]")?;
        }
        Ok(())
    }
}

/// Ordered step results of a smoke run
///
/// Steps after the first failure are never executed, so a failed step is
/// always the last entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmokeTestReport {
    pub steps: Vec<TestStepResult>,
    pub highlights: Vec<NewsHighlight>,
}

impl SmokeTestReport {
    /// Append a step result, returning whether the run may continue
    pub fn record(&mut self, step: TestStepResult) -> bool {
        let passed = step.passed;
        self.steps.push(step);
        passed
    }

    pub fn all_passed(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(|s| s.passed)
    }

    pub fn failed_step(&self) -> Option<&TestStepResult> {
        self.steps.iter().find(|s| !s.passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_summary() {
        let mut report = SmokeTestReport::default();
        assert!(!report.all_passed());

        assert!(report.record(TestStepResult::pass("search", "total_found=3")));
        assert!(report.all_passed());

        assert!(!report.record(TestStepResult::fail("ask", "no answer")));
        assert!(!report.all_passed());
        assert_eq!(report.failed_step().unwrap().step_name, "ask");
    }

    #[test]
    fn test_highlight_display() {
        let highlight = NewsHighlight {
            title: "Rate decision".to_string(),
            similarity_percent: 87.26,
            critical: true,
        };
        assert_eq!(highlight.to_string(), "Rate decision (87.3%) [critical]");
    }
}
