use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use plancheck_core::api::{ExecutionRequest, PlannerError, PlannerPlugin, StepOutput};

/// Planner stand-in keyed by working directory. Unknown roots plan cleanly.
#[derive(Default)]
pub struct FakePlanner {
    scripts: HashMap<PathBuf, (StepOutput, StepOutput)>,
}

impl FakePlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(mut self, dir: &str, init: StepOutput, plan: StepOutput) -> Self {
        self.scripts.insert(PathBuf::from(dir), (init, plan));
        self
    }

    pub fn into_plugin(self) -> Arc<dyn PlannerPlugin> {
        Arc::new(self)
    }

    fn script(&self, req: &ExecutionRequest) -> (StepOutput, StepOutput) {
        self.scripts
            .get(&req.working_dir)
            .cloned()
            .unwrap_or_else(|| (StepOutput::success(""), StepOutput::success("No changes.")))
    }
}

#[async_trait]
impl PlannerPlugin for FakePlanner {
    fn name(&self) -> &str {
        "terraform"
    }

    async fn init(&self, req: &ExecutionRequest) -> Result<StepOutput, PlannerError> {
        Ok(self.script(req).0)
    }

    async fn plan(&self, req: &ExecutionRequest) -> Result<StepOutput, PlannerError> {
        Ok(self.script(req).1)
    }
}

pub fn plan_error(root: &str, stderr: &str) -> FakePlanner {
    FakePlanner::new().root(root, StepOutput::success(""), StepOutput::failed(1, stderr))
}
