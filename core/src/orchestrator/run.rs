use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tracing::Instrument;

use crate::classifier::SignalClassifier;
use crate::outcome::Outcome;
use crate::planner::{
    ExecutionRequest, ExecutionResult, FailureSignal, PlanStep, PlannerPlugin, StepOutput,
};
use crate::report::RunReport;

/// Drives init + plan for one request and resolves the result to an [`Outcome`].
///
/// Nothing here returns an error: adapter faults become failure signals and go
/// through the classifier like any other planner error.
pub struct PlanOrchestrator<C> {
    planner: Arc<dyn PlannerPlugin>,
    classifier: C,
}

impl<C: SignalClassifier> PlanOrchestrator<C> {
    pub fn new(planner: Arc<dyn PlannerPlugin>, classifier: C) -> Self {
        Self {
            planner,
            classifier,
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Runs the planner and captures its raw result. Plan is skipped if init fails.
    pub async fn execute(&self, req: &ExecutionRequest) -> ExecutionResult {
        let signal = match self.step(PlanStep::Init, req).await {
            Ok(_) => match self.step(PlanStep::Plan, req).await {
                Ok(plan) => {
                    return ExecutionResult {
                        output: plan.stdout,
                        signal: None,
                        request: req.clone(),
                    }
                }
                Err(sig) => sig,
            },
            Err(sig) => sig,
        };

        ExecutionResult {
            output: String::new(),
            signal: Some(signal),
            request: req.clone(),
        }
    }

    /// Maps a captured result to its verdict. The classifier only sees failures.
    pub fn resolve(&self, result: ExecutionResult) -> Outcome {
        match result.signal {
            None => Outcome::Success {
                output: result.output,
            },
            Some(signal) => self.classifier.classify(&signal),
        }
    }

    pub async fn run(&self, req: &ExecutionRequest) -> Outcome {
        let result = self.execute(req).await;
        self.resolve(result)
    }

    /// [`run`](Self::run) plus timing and a run id, under its own tracing span.
    pub async fn run_report(&self, req: &ExecutionRequest) -> RunReport {
        let run_id = uuid::Uuid::new_v4().to_string();
        let root = req.root_label();
        let span = tracing::info_span!("plan.run", run_id = %run_id, root = %root);

        async move {
            let started_at = chrono::Utc::now().to_rfc3339();
            let started = Instant::now();
            let outcome = self.run(req).await;
            let duration_ms = started.elapsed().as_millis() as u64;

            let verdict = outcome.verdict_name();
            match &outcome {
                Outcome::Success { .. } => tracing::info!(verdict, duration_ms, "plan succeeded"),
                Outcome::EnvironmentSkip {
                    category, reason, ..
                } => tracing::warn!(verdict, %category, %reason, duration_ms, "plan skipped"),
                Outcome::Failure { signal, .. } => {
                    tracing::error!(verdict, step = %signal.step, duration_ms, "plan failed")
                }
            }

            RunReport {
                run_id,
                root,
                started_at,
                duration_ms,
                outcome,
            }
        }
        .instrument(span)
        .await
    }

    /// Validates independent roots concurrently. Reports come back in request order.
    pub async fn run_many(&self, reqs: &[ExecutionRequest]) -> Vec<RunReport> {
        join_all(reqs.iter().map(|req| self.run_report(req))).await
    }

    async fn step(
        &self,
        step: PlanStep,
        req: &ExecutionRequest,
    ) -> Result<StepOutput, FailureSignal> {
        tracing::debug!(planner = self.planner.name(), %step, "planner step start");
        let res = match step {
            PlanStep::Init => self.planner.init(req).await,
            PlanStep::Plan => self.planner.plan(req).await,
        };

        match res {
            Ok(out) if out.is_success() => Ok(out),
            Ok(out) => {
                tracing::debug!(%step, exit_code = out.exit_code, "planner step failed");
                Err(FailureSignal::from_step(self.planner.name(), step, &out))
            }
            Err(e) => {
                tracing::debug!(%step, error = %e, "planner adapter error");
                Err(FailureSignal::new(step, e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::RuleTable;
    use crate::error::PlannerError;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedPlanner {
        init: Mutex<Option<Result<StepOutput, PlannerError>>>,
        plan: Mutex<Option<Result<StepOutput, PlannerError>>>,
        plan_calls: AtomicUsize,
    }

    impl ScriptedPlanner {
        fn new(
            init: Result<StepOutput, PlannerError>,
            plan: Result<StepOutput, PlannerError>,
        ) -> Arc<Self> {
            Arc::new(Self {
                init: Mutex::new(Some(init)),
                plan: Mutex::new(Some(plan)),
                plan_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PlannerPlugin for ScriptedPlanner {
        fn name(&self) -> &str {
            "terraform"
        }

        async fn init(&self, _req: &ExecutionRequest) -> Result<StepOutput, PlannerError> {
            self.init.lock().unwrap().take().expect("init called twice")
        }

        async fn plan(&self, _req: &ExecutionRequest) -> Result<StepOutput, PlannerError> {
            self.plan_calls.fetch_add(1, Ordering::SeqCst);
            self.plan.lock().unwrap().take().expect("plan called twice")
        }
    }

    #[derive(Default)]
    struct CountingClassifier {
        calls: AtomicUsize,
    }

    impl SignalClassifier for CountingClassifier {
        fn classify(&self, signal: &FailureSignal) -> Outcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Outcome::Failure {
                signal: signal.clone(),
                pinned_by: None,
            }
        }
    }

    fn req() -> ExecutionRequest {
        ExecutionRequest::new("..").with_var_file("test/fixtures/root.auto.tfvars.json")
    }

    #[tokio::test]
    async fn success_passes_output_through_without_classifying() {
        let output = "\nNo changes. Your infrastructure matches the configuration.\n";
        let planner = ScriptedPlanner::new(
            Ok(StepOutput::success("Terraform has been successfully initialized!")),
            Ok(StepOutput::success(output)),
        );
        let orch = PlanOrchestrator::new(planner, CountingClassifier::default());

        let outcome = orch.run(&req()).await;

        assert_eq!(
            outcome,
            Outcome::Success {
                output: output.to_string()
            }
        );
        assert_eq!(orch.classifier().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn init_failure_skips_plan_and_is_classified() {
        let planner = ScriptedPlanner::new(
            Ok(StepOutput::failed(
                1,
                "Error: error configuring S3 Backend: No valid credential sources found",
            )),
            Ok(StepOutput::success("unreachable")),
        );
        let orch = PlanOrchestrator::new(planner.clone(), RuleTable::default());

        let result = orch.execute(&req()).await;
        assert!(!result.is_success());
        assert_eq!(result.request, req());
        assert_eq!(planner.plan_calls.load(Ordering::SeqCst), 0);

        match orch.resolve(result) {
            Outcome::EnvironmentSkip { reason, signal, .. } => {
                assert_eq!(reason, "missing credentials");
                assert_eq!(signal.step, PlanStep::Init);
                assert_eq!(signal.exit_code, Some(1));
            }
            other => panic!("expected skip, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn plan_failure_keeps_full_diagnostic() {
        let stderr = "Error: Invalid resource reference, unknown resource 'aws_s3_bucket.foo'";
        let planner = ScriptedPlanner::new(
            Ok(StepOutput::success("")),
            Ok(StepOutput::failed(1, stderr)),
        );
        let orch = PlanOrchestrator::new(planner, RuleTable::default());

        match orch.run(&req()).await {
            Outcome::Failure { signal, pinned_by } => {
                assert_eq!(signal.step, PlanStep::Plan);
                assert!(signal.message.contains(stderr));
                assert_eq!(pinned_by, None);
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn adapter_error_becomes_failure_signal() {
        let planner = ScriptedPlanner::new(
            Err(PlannerError::Timeout {
                step: "init",
                secs: 5,
            }),
            Ok(StepOutput::success("")),
        );
        let orch = PlanOrchestrator::new(planner, RuleTable::default());

        match orch.run(&req()).await {
            Outcome::Failure { signal, .. } => {
                assert_eq!(signal.message, "init timed out after 5s");
                assert_eq!(signal.exit_code, None);
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn run_many_keeps_request_order() {
        let ok = ScriptedPlanner::new(Ok(StepOutput::success("")), Ok(StepOutput::success("")));
        let orch = PlanOrchestrator::new(ok, RuleTable::default());
        let reports = orch.run_many(&[ExecutionRequest::new("a")]).await;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].root, "a");
        assert!(!reports[0].run_id.is_empty());
    }
}
