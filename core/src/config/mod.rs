mod load;
mod types;

pub use load::{apply_env_overrides, get_plancheck_data_dir, load_default, load_from_path};
pub use types::{
    AppConfig, ClassifierConfig, GateConfig, LoggingConfig, PlannerConfig, RequestConfig,
    RulePosition, RuleSpec, TerraformConfig,
};
