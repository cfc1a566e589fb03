pub mod config;
pub mod engine;
pub mod validation;

pub use config::*;
pub use engine::{score_rules, RuleBreakdown, RuleContribution, RuleResult};
pub use validation::validate_rules;
