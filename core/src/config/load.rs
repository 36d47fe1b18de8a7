use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::types::{AppConfig, PlannerConfig};

pub const LOCAL_CONFIG_FILE: &str = "plancheck.toml";

/// Get the default plancheck data directory: ~/.plancheck
pub fn get_plancheck_data_dir() -> Result<PathBuf, ConfigError> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| ConfigError::Other("Cannot determine home directory".into()))?;
    Ok(PathBuf::from(home).join(".plancheck"))
}

pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str::<AppConfig>(&s).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_default() -> Result<AppConfig, ConfigError> {
    // Priority 1: ~/.plancheck/config.toml
    let home_config = get_plancheck_data_dir()?.join("config.toml");

    // Priority 2: ./plancheck.toml
    let local_config = Path::new(LOCAL_CONFIG_FILE);

    let mut cfg = if home_config.exists() {
        load_from_path(&home_config)?
    } else if local_config.exists() {
        load_from_path(local_config)?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Environment variable overrides (highest priority).
pub fn apply_env_overrides(cfg: &mut AppConfig) {
    if let Ok(v) = std::env::var("PLANCHECK_TERRAFORM_BIN") {
        if !v.trim().is_empty() {
            let PlannerConfig::Terraform(ref mut tf) = cfg.planner;
            tf.binary = v;
        }
    }
    if let Ok(v) = std::env::var("PLANCHECK_LOG_LEVEL") {
        if !v.trim().is_empty() {
            cfg.logging.level = v;
        }
    }
}
