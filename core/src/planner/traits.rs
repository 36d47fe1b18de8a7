use async_trait::async_trait;

use crate::error::PlannerError;

use super::types::{ExecutionRequest, StepOutput};

/// The external planning tool, as seen by the orchestrator.
///
/// A non-zero `exit_code` is a normal return; `Err` is reserved for the
/// adapter failing to drive the tool at all (spawn, timeout, pipe errors).
#[async_trait]
pub trait PlannerPlugin: Send + Sync {
    fn name(&self) -> &str;
    async fn init(&self, req: &ExecutionRequest) -> Result<StepOutput, PlannerError>;
    async fn plan(&self, req: &ExecutionRequest) -> Result<StepOutput, PlannerError>;
}
