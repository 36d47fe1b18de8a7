use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "plancheck",
    version,
    about = "Check that an infrastructure definition still plans, skipping when credentials are absent"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file. Defaults to ~/.plancheck/config.toml, then ./plancheck.toml.
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Exit with status 3 when a run was skipped instead of treating it as success.
    #[arg(long, global = true)]
    pub fail_on_skip: bool,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Root module directory. Repeat to validate several roots concurrently.
    #[arg(long = "dir", action = clap::ArgAction::Append)]
    pub dirs: Vec<String>,

    /// Variable file passed to plan, in order. Replaces configured var files.
    #[arg(long = "var-file", action = clap::ArgAction::Append)]
    pub var_files: Vec<String>,

    /// Backend configuration (KEY=VALUE). Merged over configured values.
    #[arg(long = "backend-config", value_parser = parse_key_val, action = clap::ArgAction::Append)]
    pub backend_config: Vec<(String, String)>,

    /// Extra environment for the planner process (KEY=VALUE).
    #[arg(long = "env", value_parser = parse_key_val, action = clap::ArgAction::Append)]
    pub env: Vec<(String, String)>,

    /// Keep planner colour codes in the output.
    #[arg(long)]
    pub color: bool,

    #[arg(long)]
    pub terraform_bin: Option<String>,

    /// Deadline for each planner step, in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ClassifyArgs {
    /// File holding the error text. Reads stdin when omitted.
    #[arg(long)]
    pub file: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run init + plan and report a verdict (default).
    Check(CheckArgs),
    /// Classify captured planner error text without running anything.
    Classify(ClassifyArgs),
    /// Print the effective rule table in match order.
    Rules,
}

pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let k = k.trim();
    if k.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((k.to_string(), v.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_val_splits_on_first_equals() {
        assert_eq!(
            parse_key_val(r#"assume_role={"role_arn":"a=b"}"#),
            Ok((
                "assume_role".to_string(),
                r#"{"role_arn":"a=b"}"#.to_string()
            ))
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn no_subcommand_parses() {
        let args = Args::try_parse_from(["plancheck"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.format, OutputFormat::Text);
    }

    #[test]
    fn check_flags_repeat() {
        let args = Args::try_parse_from([
            "plancheck",
            "check",
            "--dir",
            "a",
            "--dir",
            "b",
            "--var-file",
            "x.tfvars",
            "--backend-config",
            "bucket=state",
            "--fail-on-skip",
            "--format",
            "json",
        ])
        .unwrap();
        let Some(Commands::Check(check)) = args.command else {
            panic!("expected check");
        };
        assert_eq!(check.dirs, vec!["a", "b"]);
        assert_eq!(check.var_files, vec!["x.tfvars"]);
        assert_eq!(
            check.backend_config,
            vec![("bucket".to_string(), "state".to_string())]
        );
        assert!(args.fail_on_skip);
        assert_eq!(args.format, OutputFormat::Json);
    }
}
