use std::sync::Arc;

use crate::error::ConfigError;
use crate::outcome::Outcome;
use crate::planner::{FailureSignal, PlanStep};

use super::rules::{default_rules, ClassificationRule};

/// Maps a failure signal to `EnvironmentSkip` or `Failure`. Never `Success`.
pub trait SignalClassifier: Send + Sync {
    fn classify(&self, signal: &FailureSignal) -> Outcome;
}

impl<T: SignalClassifier + ?Sized> SignalClassifier for Arc<T> {
    fn classify(&self, signal: &FailureSignal) -> Outcome {
        (**self).classify(signal)
    }
}

/// Ordered, read-only rule set. Built once through [`RuleTableBuilder`].
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Arc<[ClassificationRule]>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self {
            rules: default_rules().into(),
        }
    }
}

impl RuleTable {
    pub fn builder() -> RuleTableBuilder {
        RuleTableBuilder::default()
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule whose pattern occurs in `text`.
    pub fn first_match(&self, text: &str) -> Option<&ClassificationRule> {
        self.rules.iter().find(|r| r.matches(text))
    }

    /// Classifies bare error text, e.g. a captured log.
    pub fn classify_text(&self, text: &str) -> Outcome {
        self.classify(&FailureSignal::new(PlanStep::Plan, text))
    }
}

impl SignalClassifier for RuleTable {
    fn classify(&self, signal: &FailureSignal) -> Outcome {
        match self.first_match(&signal.message) {
            Some(rule) if rule.category.is_environmental() => {
                tracing::debug!(
                    pattern = %rule.pattern,
                    category = %rule.category,
                    "failure signal matched environmental rule"
                );
                Outcome::EnvironmentSkip {
                    category: rule.category,
                    reason: rule.render_reason(),
                    pattern: rule.pattern.clone(),
                    signal: signal.clone(),
                }
            }
            Some(rule) => {
                tracing::debug!(pattern = %rule.pattern, "failure signal pinned as defect");
                Outcome::Failure {
                    signal: signal.clone(),
                    pinned_by: Some(rule.pattern.clone()),
                }
            }
            None => Outcome::Failure {
                signal: signal.clone(),
                pinned_by: None,
            },
        }
    }
}

#[derive(Debug, Default)]
pub struct RuleTableBuilder {
    rules: Vec<ClassificationRule>,
}

impl RuleTableBuilder {
    pub fn with_defaults(mut self) -> Self {
        self.rules.extend(default_rules());
        self
    }

    /// Appends after every rule added so far.
    pub fn push(mut self, rule: ClassificationRule) -> Result<Self, ConfigError> {
        validate(&rule)?;
        self.rules.push(rule);
        Ok(self)
    }

    /// Inserts ahead of every rule added so far.
    pub fn push_front(mut self, rule: ClassificationRule) -> Result<Self, ConfigError> {
        validate(&rule)?;
        self.rules.insert(0, rule);
        Ok(self)
    }

    pub fn build(self) -> RuleTable {
        RuleTable {
            rules: self.rules.into(),
        }
    }
}

fn validate(rule: &ClassificationRule) -> Result<(), ConfigError> {
    if rule.pattern.is_empty() {
        return Err(ConfigError::InvalidRule(format!(
            "empty pattern for category {}",
            rule.category
        )));
    }
    if rule.category.is_environmental() && rule.reason.trim().is_empty() {
        return Err(ConfigError::InvalidRule(format!(
            "rule '{}' needs a reason",
            rule.pattern
        )));
    }
    Ok(())
}
