use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Everything the external planner needs for one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub working_dir: PathBuf,
    /// Passed to the planner in this order.
    pub var_files: Vec<PathBuf>,
    pub backend_config: BTreeMap<String, String>,
    pub no_color: bool,
    /// Extra environment for the planner process.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub envs: HashMap<String, String>,
}

impl ExecutionRequest {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            var_files: Vec::new(),
            backend_config: BTreeMap::new(),
            no_color: true,
            envs: HashMap::new(),
        }
    }

    pub fn with_var_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.var_files.push(path.into());
        self
    }

    pub fn with_backend_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.backend_config.insert(key.into(), value.into());
        self
    }

    pub fn with_no_color(mut self, no_color: bool) -> Self {
        self.no_color = no_color;
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.insert(key.into(), value.into());
        self
    }

    /// Short label used in logs and reports.
    pub fn root_label(&self) -> String {
        self.working_dir.display().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStep {
    Init,
    Plan,
}

impl PlanStep {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanStep::Init => "init",
            PlanStep::Plan => "plan",
        }
    }
}

impl fmt::Display for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw result of a single planner step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl StepOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// The planner's error text, kept verbatim for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureSignal {
    pub step: PlanStep,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl FailureSignal {
    pub fn new(step: PlanStep, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
            exit_code: None,
        }
    }

    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        self.exit_code = Some(exit_code);
        self
    }

    /// Builds the signal for a step that exited non-zero.
    ///
    /// stderr carries the planner's diagnostics; stdout is used only when
    /// stderr is empty. Neither is truncated.
    pub fn from_step(tool: &str, step: PlanStep, out: &StepOutput) -> Self {
        let detail = if out.stderr.trim().is_empty() {
            out.stdout.trim_end()
        } else {
            out.stderr.trim_end()
        };
        let head = format!("{tool} {step} failed (exit status {})", out.exit_code);
        let message = if detail.is_empty() {
            head
        } else {
            format!("{head}\n{detail}")
        };
        Self::new(step, message).with_exit_code(out.exit_code)
    }
}

impl fmt::Display for FailureSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Captured result of one orchestrated invocation. `signal == None` means success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub output: String,
    pub signal: Option<FailureSignal>,
    pub request: ExecutionRequest,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.signal.is_none()
    }
}
