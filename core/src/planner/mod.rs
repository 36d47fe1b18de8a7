mod traits;
pub mod types;

pub use traits::PlannerPlugin;
pub use types::{ExecutionRequest, ExecutionResult, FailureSignal, PlanStep, StepOutput};
