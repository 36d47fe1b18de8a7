//! Pre-invocation bypass toggle. Checked before any planner call and kept
//! apart from classification.

pub const DEFAULT_SKIP_ENV: &str = "SKIP_TERRAFORM_TESTS";

/// Returns a reason when the named variable asks for the whole validation to be bypassed.
pub fn bypass_reason(var: &str) -> Option<String> {
    let value = std::env::var(var).ok()?;
    is_truthy(&value).then(|| format!("Skipping plan validation because {var} is set"))
}

fn is_truthy(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_true_bypasses() {
        assert!(is_truthy("true"));
        assert!(is_truthy(" TRUE\n"));
        assert!(!is_truthy("1"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn reads_named_variable() {
        let var = "PLANCHECK_TEST_GATE_READS_NAMED_VARIABLE";
        std::env::set_var(var, "true");
        let reason = bypass_reason(var);
        std::env::remove_var(var);
        assert_eq!(
            reason.as_deref(),
            Some("Skipping plan validation because PLANCHECK_TEST_GATE_READS_NAMED_VARIABLE is set")
        );
        assert_eq!(bypass_reason("PLANCHECK_TEST_GATE_UNSET_VARIABLE"), None);
    }
}
