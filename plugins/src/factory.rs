use std::sync::Arc;

use plancheck_core::api::{
    AppConfig, ConfigError, PlanOrchestrator, PlannerConfig, PlannerPlugin, RuleTable,
};

use crate::planner::TerraformPlanner;

pub fn build_planner(cfg: &AppConfig) -> Arc<dyn PlannerPlugin> {
    match &cfg.planner {
        PlannerConfig::Terraform(tf_cfg) => Arc::new(TerraformPlanner::new(tf_cfg)),
    }
}

pub fn build_classifier(cfg: &AppConfig) -> Result<RuleTable, ConfigError> {
    cfg.classifier.build_table()
}

pub fn build_orchestrator(cfg: &AppConfig) -> Result<PlanOrchestrator<RuleTable>, ConfigError> {
    let classifier = build_classifier(cfg)?;
    tracing::debug!(rules = classifier.len(), "rule table ready");
    Ok(PlanOrchestrator::new(build_planner(cfg), classifier))
}

#[cfg(test)]
mod tests {
    use super::*;
    use plancheck_core::api::{
        Disposition, ExecutionRequest, Outcome, RuleCategory, RulePosition, RuleSpec,
        TerraformConfig,
    };

    #[test]
    fn terraform_is_the_default_planner() {
        assert_eq!(build_planner(&AppConfig::default()).name(), "terraform");
    }

    #[test]
    fn invalid_rule_surfaces_as_error() {
        let mut cfg = AppConfig::default();
        cfg.classifier.rules.push(RuleSpec {
            pattern: String::new(),
            category: RuleCategory::Environment,
            reason: "x".into(),
            position: RulePosition::Append,
        });
        assert!(build_orchestrator(&cfg).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn real_process_failure_is_classified() {
        let cfg = AppConfig {
            planner: PlannerConfig::Terraform(TerraformConfig {
                binary: "false".into(),
                ..TerraformConfig::default()
            }),
            ..AppConfig::default()
        };
        let orch = build_orchestrator(&cfg).unwrap();

        let outcome = orch.run(&ExecutionRequest::new(std::env::temp_dir())).await;
        assert_eq!(outcome.disposition(), Disposition::Fail);
        match outcome {
            Outcome::Failure { signal, .. } => {
                assert_eq!(signal.message, "terraform init failed (exit status 1)");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn real_process_success_passes() {
        let cfg = AppConfig {
            planner: PlannerConfig::Terraform(TerraformConfig {
                binary: "true".into(),
                ..TerraformConfig::default()
            }),
            ..AppConfig::default()
        };
        let orch = build_orchestrator(&cfg).unwrap();

        let outcome = orch.run(&ExecutionRequest::new(std::env::temp_dir())).await;
        assert_eq!(
            outcome,
            Outcome::Success {
                output: String::new()
            }
        );
    }
}
