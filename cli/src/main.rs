use clap::Parser;
use plancheck_cli::app;
use plancheck_cli::commands::cli;
use plancheck_core::api::{self as core_api, CliError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let mut args = cli::Args::parse();
    let cfg = match args.config.as_deref() {
        Some(path) => {
            let mut cfg = core_api::load_from_path(std::path::Path::new(path))?;
            plancheck_core::config::apply_env_overrides(&mut cfg);
            cfg
        }
        None => core_api::load_default()?,
    };
    init_tracing(&cfg.logging).map_err(|e| CliError::Anyhow(anyhow::anyhow!(e)))?;

    let cmd = args
        .command
        .take()
        .unwrap_or_else(|| cli::Commands::Check(cli::CheckArgs::default()));

    match cmd {
        cli::Commands::Check(check) => app::run_check(&args, check, cfg).await,
        cli::Commands::Classify(classify) => app::run_classify(&args, classify, &cfg),
        cli::Commands::Rules => app::run_rules(&args, &cfg),
    }
}

fn exit_code_for_error(e: &CliError) -> i32 {
    // 0: passed (or skipped without --fail-on-skip)
    // 1: plan failed, including planner spawn/timeout faults
    // 3: skipped with --fail-on-skip
    // 11: config error
    // 50: internal/uncategorized
    match e {
        CliError::Config(_) => 11,
        CliError::Anyhow(_) => 50,
    }
}

fn init_tracing(logging: &core_api::LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }
    if !logging.console && !logging.file {
        return Err("logging disabled for both console and file".to_string());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let file_layer = if logging.file {
        let writer = file_writer(&log_dir(logging))?;
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
    } else {
        None
    };

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}

fn log_dir(logging: &core_api::LoggingConfig) -> std::path::PathBuf {
    logging
        .directory
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("plancheck"))
}

fn file_writer(
    dir: &std::path::Path,
) -> Result<tracing_appender::non_blocking::NonBlocking, String> {
    std::fs::create_dir_all(dir).map_err(|e| format!("create log dir failed: {e}"))?;
    let file_name = format!("plancheck.{}.log", std::process::id());
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);
    Ok(non_blocking)
}
