use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use plancheck_core::api::{
    ExecutionRequest, PlanStep, PlannerError, PlannerPlugin, StepOutput, TerraformConfig,
};
use tokio::process::Command;

/// Runs `terraform init` / `terraform plan` as child processes.
pub struct TerraformPlanner {
    binary: String,
    timeout: Option<Duration>,
    envs: HashMap<String, String>,
}

impl TerraformPlanner {
    pub fn new(cfg: &TerraformConfig) -> Self {
        Self {
            binary: cfg.binary.clone(),
            timeout: cfg.timeout_secs.map(Duration::from_secs),
            envs: cfg.envs.clone(),
        }
    }

    pub fn init_args(req: &ExecutionRequest) -> Vec<String> {
        let mut args = vec!["init".to_string(), "-upgrade=false".to_string()];
        for (k, v) in &req.backend_config {
            args.push(format!("-backend-config={k}={v}"));
        }
        if req.no_color {
            args.push("-no-color".to_string());
        }
        args
    }

    pub fn plan_args(req: &ExecutionRequest) -> Vec<String> {
        let mut args = vec![
            "plan".to_string(),
            "-input=false".to_string(),
            "-lock=false".to_string(),
        ];
        for f in &req.var_files {
            let path = f.to_string_lossy();
            args.push(format!("-var-file={}", shellexpand::tilde(&path)));
        }
        if req.no_color {
            args.push("-no-color".to_string());
        }
        args
    }

    async fn invoke(
        &self,
        step: PlanStep,
        args: Vec<String>,
        req: &ExecutionRequest,
    ) -> Result<StepOutput, PlannerError> {
        let program = which::which(&self.binary).map_err(|e| {
            PlannerError::Spawn(format!("cannot locate planner binary '{}': {e}", self.binary))
        })?;

        tracing::debug!(
            program = %program.display(),
            dir = %req.working_dir.display(),
            ?args,
            "spawning planner"
        );

        let child = Command::new(&program)
            .args(&args)
            .current_dir(&req.working_dir)
            .envs(&self.envs)
            .envs(&req.envs)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PlannerError::Spawn(format!("{}: {e}", program.display())))?;

        // Dropping the future on timeout drops the child, which kills it.
        let waited = child.wait_with_output();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, waited).await.map_err(|_| {
                PlannerError::Timeout {
                    step: step.as_str(),
                    secs: limit.as_secs(),
                }
            })?,
            None => waited.await,
        }
        .map_err(|source| PlannerError::Io {
            step: step.as_str(),
            source,
        })?;

        Ok(StepOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[async_trait]
impl PlannerPlugin for TerraformPlanner {
    fn name(&self) -> &str {
        "terraform"
    }

    async fn init(&self, req: &ExecutionRequest) -> Result<StepOutput, PlannerError> {
        self.invoke(PlanStep::Init, Self::init_args(req), req).await
    }

    async fn plan(&self, req: &ExecutionRequest) -> Result<StepOutput, PlannerError> {
        self.invoke(PlanStep::Plan, Self::plan_args(req), req).await
    }
}
