//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `plancheck_core::api` instead of reaching into internal modules.

pub use crate::classifier::{
    default_rules, ClassificationRule, RuleCategory, RuleTable, RuleTableBuilder,
    SignalClassifier,
};
pub use crate::config::{
    load_default, load_from_path, AppConfig, ClassifierConfig, GateConfig, LoggingConfig,
    PlannerConfig, RequestConfig, RulePosition, RuleSpec, TerraformConfig,
};
pub use crate::error::{CliError, ConfigError, PlannerError};
pub use crate::gate::{bypass_reason, DEFAULT_SKIP_ENV};
pub use crate::orchestrator::PlanOrchestrator;
pub use crate::outcome::{Disposition, Outcome};
pub use crate::planner::{
    ExecutionRequest, ExecutionResult, FailureSignal, PlanStep, PlannerPlugin, StepOutput,
};
pub use crate::report::{RunReport, RunSummary, EXIT_FAILED, EXIT_OK, EXIT_SKIPPED};
