use serde::{Deserialize, Serialize};

use crate::outcome::{Disposition, Outcome};

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_SKIPPED: i32 = 3;

/// One validated root, as handed to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub root: String,
    pub started_at: String,
    pub duration_ms: u64,
    pub outcome: Outcome,
}

impl RunReport {
    pub fn render_text(&self) -> String {
        format!(
            "[{}] {} ({} ms): {}",
            self.outcome.disposition(),
            self.root,
            self.duration_ms,
            self.outcome.render()
        )
    }

    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub passed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn from_dispositions(items: impl IntoIterator<Item = Disposition>) -> Self {
        let mut summary = Self::default();
        for d in items {
            match d {
                Disposition::Pass => summary.passed += 1,
                Disposition::Skip => summary.skipped += 1,
                Disposition::Fail => summary.failed += 1,
            }
        }
        summary
    }

    pub fn from_reports(reports: &[RunReport]) -> Self {
        Self::from_dispositions(reports.iter().map(|r| r.outcome.disposition()))
    }

    /// 1 on any failure; 3 when something was skipped and skips are not tolerated.
    pub fn exit_code(&self, fail_on_skip: bool) -> i32 {
        if self.failed > 0 {
            EXIT_FAILED
        } else if fail_on_skip && self.skipped > 0 {
            EXIT_SKIPPED
        } else {
            EXIT_OK
        }
    }

    pub fn render(&self) -> String {
        format!(
            "{} passed, {} skipped, {} failed",
            self.passed, self.skipped, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_dominates_exit_code() {
        let s = RunSummary::from_dispositions([
            Disposition::Pass,
            Disposition::Skip,
            Disposition::Fail,
        ]);
        assert_eq!(s.exit_code(false), EXIT_FAILED);
        assert_eq!(s.exit_code(true), EXIT_FAILED);
        assert_eq!(s.render(), "1 passed, 1 skipped, 1 failed");
    }

    #[test]
    fn skips_only_fail_when_asked() {
        let s = RunSummary::from_dispositions([Disposition::Skip, Disposition::Pass]);
        assert_eq!(s.exit_code(false), EXIT_OK);
        assert_eq!(s.exit_code(true), EXIT_SKIPPED);
    }

    #[test]
    fn empty_run_is_ok() {
        assert_eq!(RunSummary::default().exit_code(true), EXIT_OK);
    }

    #[test]
    fn text_line_carries_disposition_and_root() {
        let report = RunReport {
            run_id: "r1".into(),
            root: "infra/prod".into(),
            started_at: "2026-01-01T00:00:00+00:00".into(),
            duration_ms: 12,
            outcome: Outcome::Success {
                output: "No changes.".into(),
            },
        };
        assert_eq!(
            report.render_text(),
            "[PASS] infra/prod (12 ms): plan succeeded\nNo changes."
        );
        let json: serde_json::Value =
            serde_json::from_str(&report.render_json().unwrap()).unwrap();
        assert_eq!(json["outcome"]["verdict"], "success");
    }
}
