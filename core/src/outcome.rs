use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classifier::RuleCategory;
use crate::planner::FailureSignal;

/// Terminal verdict of one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Outcome {
    Success {
        output: String,
    },
    EnvironmentSkip {
        category: RuleCategory,
        reason: String,
        pattern: String,
        signal: FailureSignal,
    },
    Failure {
        signal: FailureSignal,
        /// Set when a `defect` rule matched rather than the fail-closed default.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pinned_by: Option<String>,
    },
}

/// What a caller should do with an [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Pass,
    Skip,
    Fail,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Disposition::Pass => "PASS",
            Disposition::Skip => "SKIP",
            Disposition::Fail => "FAIL",
        })
    }
}

impl Outcome {
    pub fn disposition(&self) -> Disposition {
        match self {
            Outcome::Success { .. } => Disposition::Pass,
            Outcome::EnvironmentSkip { .. } => Disposition::Skip,
            Outcome::Failure { .. } => Disposition::Fail,
        }
    }

    pub fn verdict_name(&self) -> &'static str {
        match self {
            Outcome::Success { .. } => "success",
            Outcome::EnvironmentSkip { .. } => "environment_skip",
            Outcome::Failure { .. } => "failure",
        }
    }

    pub fn signal(&self) -> Option<&FailureSignal> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::EnvironmentSkip { signal, .. } | Outcome::Failure { signal, .. } => {
                Some(signal)
            }
        }
    }

    /// Human-readable rendering. Diagnostics are included in full.
    pub fn render(&self) -> String {
        match self {
            Outcome::Success { output } => {
                if output.is_empty() {
                    "plan succeeded".to_string()
                } else {
                    format!("plan succeeded\n{output}")
                }
            }
            Outcome::EnvironmentSkip {
                category,
                reason,
                signal,
                ..
            } => format!(
                "Skipping plan due to {} ({reason}): {}",
                category.group_label(),
                signal.message
            ),
            Outcome::Failure { signal, .. } => {
                format!("Unexpected planner error: {}", signal.message)
            }
        }
    }
}
