use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::classifier::{ClassificationRule, RuleCategory, RuleTable};
use crate::error::ConfigError;
use crate::gate::DEFAULT_SKIP_ENV;
use crate::planner::ExecutionRequest;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub planner: PlannerConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub request: RequestConfig,

    #[serde(default)]
    pub gate: GateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "plancheck_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// `kind` may be omitted; it defaults to `terraform`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", try_from = "RawPlannerConfig")]
pub enum PlannerConfig {
    Terraform(TerraformConfig),
}

#[derive(Deserialize)]
struct RawPlannerConfig {
    #[serde(default)]
    kind: Option<String>,
    #[serde(flatten)]
    terraform: TerraformConfig,
}

impl TryFrom<RawPlannerConfig> for PlannerConfig {
    type Error = String;

    fn try_from(raw: RawPlannerConfig) -> Result<Self, Self::Error> {
        match raw.kind.as_deref() {
            None | Some("terraform") => Ok(PlannerConfig::Terraform(raw.terraform)),
            Some(other) => Err(format!("unknown planner kind '{other}'")),
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig::Terraform(TerraformConfig::default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerraformConfig {
    #[serde(default = "default_terraform_binary")]
    pub binary: String,

    /// Per-step deadline. Unset means wait for the planner indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Environment added to every planner process.
    #[serde(default)]
    pub envs: HashMap<String, String>,
}

fn default_terraform_binary() -> String {
    "terraform".to_string()
}

impl Default for TerraformConfig {
    fn default() -> Self {
        Self {
            binary: default_terraform_binary(),
            timeout_secs: None,
            envs: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulePosition {
    Prepend,
    #[default]
    Append,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    pub pattern: String,
    pub category: RuleCategory,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub position: RulePosition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_include_defaults")]
    pub include_defaults: bool,

    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

fn default_include_defaults() -> bool {
    true
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            include_defaults: default_include_defaults(),
            rules: Vec::new(),
        }
    }
}

impl ClassifierConfig {
    /// Freezes defaults plus configured rules into a table. Prepended rules keep
    /// their relative config order.
    pub fn build_table(&self) -> Result<RuleTable, ConfigError> {
        let mut builder = RuleTable::builder();
        if self.include_defaults {
            builder = builder.with_defaults();
        }
        for spec in self
            .rules
            .iter()
            .filter(|s| s.position == RulePosition::Prepend)
            .rev()
        {
            builder = builder.push_front(spec.to_rule())?;
        }
        for spec in self
            .rules
            .iter()
            .filter(|s| s.position == RulePosition::Append)
        {
            builder = builder.push(spec.to_rule())?;
        }
        Ok(builder.build())
    }
}

impl RuleSpec {
    fn to_rule(&self) -> ClassificationRule {
        ClassificationRule::new(self.pattern.clone(), self.category, self.reason.clone())
    }
}

/// Defaults for the `check` command; flags override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    #[serde(default = "default_request_dir")]
    pub dir: String,

    #[serde(default)]
    pub var_files: Vec<String>,

    #[serde(default)]
    pub backend_config: BTreeMap<String, String>,

    #[serde(default = "default_no_color")]
    pub no_color: bool,
}

fn default_request_dir() -> String {
    "..".to_string()
}

fn default_no_color() -> bool {
    true
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            dir: default_request_dir(),
            var_files: Vec::new(),
            backend_config: BTreeMap::new(),
            no_color: default_no_color(),
        }
    }
}

impl RequestConfig {
    pub fn to_request(&self, dir: &str) -> ExecutionRequest {
        let mut req = ExecutionRequest::new(dir).with_no_color(self.no_color);
        for f in &self.var_files {
            req = req.with_var_file(f);
        }
        for (k, v) in &self.backend_config {
            req = req.with_backend_config(k, v);
        }
        req
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Environment variable that bypasses validation when set to `true`.
    #[serde(default = "default_skip_env")]
    pub skip_env: String,
}

fn default_skip_env() -> String {
    DEFAULT_SKIP_ENV.to_string()
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            skip_env: default_skip_env(),
        }
    }
}
