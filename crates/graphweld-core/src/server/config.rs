//! Server configuration
//!
//! One [`ServerConfig`] is assembled at build time by the wiring pass. The
//! HTTP adapter then derives a request-scoped copy per inbound request so
//! the shared instance never carries request state.

use std::sync::Arc;

use crate::context::RequestContext;

use super::rules::{OperationType, RuleSource, ValidationRule, default_rules};

/// Execution-time configuration handed to the GraphQL executor.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    debug: bool,
    context: Option<Arc<RequestContext>>,
    rules: RuleSource,
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether error responses carry debug detail.
    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// The request context, present only on request-scoped copies.
    pub fn context(&self) -> Option<&Arc<RequestContext>> {
        self.context.as_ref()
    }

    /// Replace the configured (non-baseline) validation rules.
    ///
    /// The baseline rule set is not affected; it is prepended again on every
    /// [`validation_rules`](Self::validation_rules) call, so this can never
    /// weaken validation below the baseline.
    pub fn set_validation_rules(&mut self, rules: RuleSource) {
        self.rules = rules;
    }

    /// The full rule set for one operation: the baseline rules followed by
    /// the configured rules.
    pub fn validation_rules(&self, operation: OperationType, query: &str) -> Vec<ValidationRule> {
        let mut rules = default_rules();
        rules.extend(self.rules.rules_for(operation, query));
        rules
    }

    /// Derive a request-scoped copy carrying `context`.
    pub fn per_request(&self, context: Arc<RequestContext>) -> Self {
        let mut config = self.clone();
        config.context = Some(context);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::rules::DEFAULT_RULE_NAMES;

    fn request_context() -> Arc<RequestContext> {
        let (parts, ()) = http::Request::builder()
            .uri("/graphql")
            .body(())
            .unwrap()
            .into_parts();
        Arc::new(RequestContext::new(parts))
    }

    #[test]
    fn test_baseline_rules_always_present() {
        let config = ServerConfig::new();
        let rules = config.validation_rules(OperationType::Query, "{ me }");
        assert_eq!(rules.len(), DEFAULT_RULE_NAMES.len());
    }

    #[test]
    fn test_configured_rules_append_after_baseline() {
        let mut config = ServerConfig::new();
        config.set_validation_rules(RuleSource::List(vec![
            ValidationRule::DisableIntrospection,
            ValidationRule::QueryDepth(8),
        ]));

        let rules = config.validation_rules(OperationType::Query, "{ me }");
        assert_eq!(rules.len(), DEFAULT_RULE_NAMES.len() + 2);
        // Baseline rules come first, configured rules after
        assert_eq!(rules[0], ValidationRule::Default(DEFAULT_RULE_NAMES[0]));
        assert_eq!(
            rules[DEFAULT_RULE_NAMES.len()],
            ValidationRule::DisableIntrospection
        );
        assert_eq!(*rules.last().unwrap(), ValidationRule::QueryDepth(8));
    }

    #[test]
    fn test_replacing_rules_cannot_drop_baseline() {
        let mut config = ServerConfig::new();
        // Even an explicitly empty configuration keeps the baseline intact
        config.set_validation_rules(RuleSource::List(Vec::new()));
        let rules = config.validation_rules(OperationType::Mutation, "mutation { logout }");
        assert_eq!(rules.len(), DEFAULT_RULE_NAMES.len());
    }

    #[test]
    fn test_per_request_copy_carries_context() {
        let mut shared = ServerConfig::new();
        shared.set_debug(true);
        assert!(shared.context().is_none());

        let scoped = shared.per_request(request_context());
        assert!(scoped.debug());
        assert!(scoped.context().is_some());

        // The shared instance is untouched
        assert!(shared.context().is_none());
    }
}
