//! Failure-signal classification: environment gap (skip) versus genuine defect (fail).
//!
//! Rules are plain data evaluated in order; the first substring hit decides.
//! Text that matches nothing is a failure.

pub mod rules;
pub mod table;

pub use rules::{default_rules, ClassificationRule, RuleCategory};
pub use table::{RuleTable, RuleTableBuilder, SignalClassifier};
