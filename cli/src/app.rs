//! CLI assembly: merge flag overrides into config, build the orchestrator, render verdicts.
use std::io::Read;

use anyhow::Context;
use plancheck_core::api::{
    self as core_api, AppConfig, CliError, ExecutionRequest, Outcome, PlannerConfig, RunReport,
    RunSummary,
};
use plancheck_plugins::factory;

use crate::commands::cli::{Args, CheckArgs, ClassifyArgs, OutputFormat};

#[tracing::instrument(name = "cli.check", skip_all)]
pub async fn run_check(args: &Args, check: CheckArgs, cfg: AppConfig) -> Result<i32, CliError> {
    if let Some(reason) = core_api::bypass_reason(&cfg.gate.skip_env) {
        tracing::info!(%reason, "validation bypassed");
        match args.format {
            OutputFormat::Text => println!("[SKIP] {reason}"),
            OutputFormat::Json => println!(
                "{}",
                serde_json::json!({ "verdict": "bypassed", "reason": reason })
            ),
        }
        return Ok(if args.fail_on_skip {
            core_api::EXIT_SKIPPED
        } else {
            core_api::EXIT_OK
        });
    }

    let cfg = apply_check_overrides(cfg, &check);
    let orch = factory::build_orchestrator(&cfg)?;
    let requests = build_requests(&cfg, &check);
    tracing::info!(roots = requests.len(), "validating");

    let reports = orch.run_many(&requests).await;
    for report in &reports {
        emit_report(args.format, report)?;
    }

    let summary = RunSummary::from_reports(&reports);
    if args.format == OutputFormat::Text {
        println!("{}", summary.render());
    }
    Ok(summary.exit_code(args.fail_on_skip))
}

pub fn run_classify(args: &Args, classify: ClassifyArgs, cfg: &AppConfig) -> Result<i32, CliError> {
    let text = match &classify.file {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };

    let table = factory::build_classifier(cfg)?;
    let outcome = table.classify_text(&text);
    emit_outcome(args.format, &outcome)?;

    let summary = RunSummary::from_dispositions([outcome.disposition()]);
    Ok(summary.exit_code(args.fail_on_skip))
}

pub fn run_rules(args: &Args, cfg: &AppConfig) -> Result<i32, CliError> {
    let table = factory::build_classifier(cfg)?;
    match args.format {
        OutputFormat::Text => {
            for (i, rule) in table.rules().iter().enumerate() {
                println!(
                    "{:>2}. [{}] {:?} -> {}",
                    i + 1,
                    rule.category,
                    rule.pattern,
                    rule.render_reason()
                );
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(table.rules()).map_err(anyhow::Error::from)?;
            println!("{json}");
        }
    }
    Ok(core_api::EXIT_OK)
}

pub fn apply_check_overrides(mut cfg: AppConfig, check: &CheckArgs) -> AppConfig {
    let PlannerConfig::Terraform(ref mut tf) = cfg.planner;
    if let Some(bin) = &check.terraform_bin {
        tf.binary = bin.clone();
    }
    if let Some(secs) = check.timeout_secs {
        tf.timeout_secs = Some(secs);
    }
    for (k, v) in &check.env {
        tf.envs.insert(k.clone(), v.clone());
    }
    cfg
}

/// One request per root. Flags win over the `[request]` config section.
pub fn build_requests(cfg: &AppConfig, check: &CheckArgs) -> Vec<ExecutionRequest> {
    let dirs = if check.dirs.is_empty() {
        vec![cfg.request.dir.clone()]
    } else {
        check.dirs.clone()
    };

    dirs.iter()
        .map(|dir| {
            let mut req = cfg.request.to_request(dir);
            if !check.var_files.is_empty() {
                req.var_files = check.var_files.iter().map(Into::into).collect();
            }
            for (k, v) in &check.backend_config {
                req = req.with_backend_config(k, v);
            }
            if check.color {
                req = req.with_no_color(false);
            }
            req
        })
        .collect()
}

fn emit_report(format: OutputFormat, report: &RunReport) -> Result<(), CliError> {
    match format {
        OutputFormat::Text => println!("{}", report.render_text()),
        OutputFormat::Json => {
            println!("{}", report.render_json().map_err(anyhow::Error::from)?)
        }
    }
    Ok(())
}

fn emit_outcome(format: OutputFormat, outcome: &Outcome) -> Result<(), CliError> {
    match format {
        OutputFormat::Text => println!("[{}] {}", outcome.disposition(), outcome.render()),
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(outcome).map_err(anyhow::Error::from)?
            )
        }
    }
    Ok(())
}
