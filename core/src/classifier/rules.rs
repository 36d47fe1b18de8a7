use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    /// No credential material found in the environment.
    MissingCredentials,
    /// The assumed-role grant was rejected or is invalid.
    InvalidGrant,
    /// The identity provider refused the role assumption.
    RoleAssumptionRefused,
    ExpiredCredentials,
    /// A provider is used without explicit configuration in this context.
    UnconfiguredProvider,
    /// Any other environmental gap declared through config.
    Environment,
    /// Pins a substring as a genuine defect, ahead of broader skip rules.
    Defect,
}

impl RuleCategory {
    pub fn is_environmental(self) -> bool {
        !matches!(self, RuleCategory::Defect)
    }

    pub fn is_credential(self) -> bool {
        matches!(
            self,
            RuleCategory::MissingCredentials
                | RuleCategory::InvalidGrant
                | RuleCategory::RoleAssumptionRefused
                | RuleCategory::ExpiredCredentials
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RuleCategory::MissingCredentials => "missing_credentials",
            RuleCategory::InvalidGrant => "invalid_grant",
            RuleCategory::RoleAssumptionRefused => "role_assumption_refused",
            RuleCategory::ExpiredCredentials => "expired_credentials",
            RuleCategory::UnconfiguredProvider => "unconfigured_provider",
            RuleCategory::Environment => "environment",
            RuleCategory::Defect => "defect",
        }
    }

    /// Group label used when rendering a skip to the user.
    pub fn group_label(self) -> &'static str {
        if self.is_credential() {
            "missing/invalid AWS credentials"
        } else if self == RuleCategory::UnconfiguredProvider {
            "missing provider configuration"
        } else {
            "environment not available"
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the rule table: a case-sensitive substring, what it means, and
/// the reason shown when it fires. `{pattern}` in `reason` expands to the
/// matched pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub pattern: String,
    pub category: RuleCategory,
    pub reason: String,
}

impl ClassificationRule {
    pub fn new(
        pattern: impl Into<String>,
        category: RuleCategory,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            category,
            reason: reason.into(),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        text.contains(self.pattern.as_str())
    }

    pub fn render_reason(&self) -> String {
        self.reason.replace("{pattern}", &self.pattern)
    }
}

/// Diagnostic vocabulary of terraform with the AWS provider, in match order.
pub fn default_rules() -> Vec<ClassificationRule> {
    vec![
        ClassificationRule::new(
            "No valid credential sources found",
            RuleCategory::MissingCredentials,
            "missing credentials",
        ),
        ClassificationRule::new(
            "InvalidGrantException",
            RuleCategory::InvalidGrant,
            "invalid/expired grant",
        ),
        ClassificationRule::new(
            "could not assume role",
            RuleCategory::RoleAssumptionRefused,
            "role assumption refused",
        ),
        ClassificationRule::new("expired", RuleCategory::ExpiredCredentials, "expired token"),
        ClassificationRule::new(
            "requires explicit configuration",
            RuleCategory::UnconfiguredProvider,
            "unconfigured provider",
        ),
    ]
}
