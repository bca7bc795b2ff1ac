//! Execution-time server configuration
//!
//! [`ServerConfig`] is the knob bundle: debug flags, validation rules and the
//! per-request context. [`rules`] holds the validation-rule model and the
//! decorator guarantee that the baseline rule set is always applied.

pub mod config;
pub mod rules;

pub use config::ServerConfig;
pub use rules::{OperationType, RuleSource, ValidationRule, apply_rules, default_rules};
