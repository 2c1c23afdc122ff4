pub mod rules;

pub use rules::{Issue, LintContext, Rule, RulesEngine, Severity};
