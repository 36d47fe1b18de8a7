use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("spawn failed: {0}")]
    Spawn(String),
    #[error("{step} timed out after {secs}s")]
    Timeout { step: &'static str, secs: u64 },
    #[error("stream io error: {step} {source}")]
    Io {
        step: &'static str,
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid classification rule: {0}")]
    InvalidRule(String),
    #[error("{0}")]
    Other(String),
}
