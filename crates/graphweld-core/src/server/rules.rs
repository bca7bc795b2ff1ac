//! Validation rules
//!
//! Every executed operation is validated by the baseline rule set required
//! for spec-compliant execution, optionally extended by protection rules
//! (introspection gating, complexity and depth limits) and user-supplied
//! rules. User configuration can only ever *add* rules; the baseline set is
//! not removable.

use std::fmt;
use std::sync::Arc;

use async_graphql::{ObjectType, SchemaBuilder, SubscriptionType};

/// Names of the baseline validation rules applied to every operation.
pub const DEFAULT_RULE_NAMES: &[&str] = &[
    "ExecutableDefinitions",
    "FieldsOnCorrectType",
    "FragmentsOnCompositeTypes",
    "KnownArgumentNames",
    "KnownDirectives",
    "KnownFragmentNames",
    "KnownTypeNames",
    "LoneAnonymousOperation",
    "NoFragmentCycles",
    "NoUndefinedVariables",
    "NoUnusedFragments",
    "NoUnusedVariables",
    "OverlappingFieldsCanBeMerged",
    "PossibleFragmentSpreads",
    "ProvidedRequiredArguments",
    "ScalarLeafs",
    "SingleFieldSubscriptions",
    "UniqueArgumentNames",
    "UniqueDirectivesPerLocation",
    "UniqueFragmentNames",
    "UniqueInputFieldNames",
    "UniqueOperationNames",
    "UniqueVariableNames",
    "ValuesOfCorrectType",
    "VariablesAreInputTypes",
    "VariablesInAllowedPosition",
];

/// A single validation rule applied before execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationRule {
    /// A baseline spec rule, identified by name
    Default(&'static str),
    /// Reject introspection queries
    DisableIntrospection,
    /// Reject queries whose computed complexity exceeds the limit
    QueryComplexity(u32),
    /// Reject queries nested deeper than the limit
    QueryDepth(u32),
    /// An application-defined rule, identified by name
    Custom(String),
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default(name) => write!(f, "{}", name),
            Self::DisableIntrospection => write!(f, "DisableIntrospection"),
            Self::QueryComplexity(limit) => write!(f, "QueryComplexity({})", limit),
            Self::QueryDepth(limit) => write!(f, "QueryDepth({})", limit),
            Self::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// The baseline rule set, in declaration order.
pub fn default_rules() -> Vec<ValidationRule> {
    DEFAULT_RULE_NAMES
        .iter()
        .copied()
        .map(ValidationRule::Default)
        .collect()
}

/// Kind of operation being validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

/// Where the configured (non-baseline) rules come from: a fixed list, or a
/// factory invoked per operation with the operation kind and query text.
#[derive(Clone)]
pub enum RuleSource {
    List(Vec<ValidationRule>),
    Factory(Arc<dyn Fn(OperationType, &str) -> Vec<ValidationRule> + Send + Sync>),
}

impl RuleSource {
    /// The configured rules for one operation.
    pub fn rules_for(&self, operation: OperationType, query: &str) -> Vec<ValidationRule> {
        match self {
            Self::List(rules) => rules.clone(),
            Self::Factory(factory) => factory(operation, query),
        }
    }
}

impl Default for RuleSource {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl fmt::Debug for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(rules) => f.debug_tuple("List").field(rules).finish(),
            Self::Factory(_) => f.debug_tuple("Factory").field(&"<fn>").finish(),
        }
    }
}

/// Map a rule set onto a schema builder.
///
/// Baseline and custom rules carry no builder-level configuration; the
/// protection rules translate to the matching builder limits.
pub fn apply_rules<Q, M, S>(
    mut builder: SchemaBuilder<Q, M, S>,
    rules: &[ValidationRule],
) -> SchemaBuilder<Q, M, S>
where
    Q: ObjectType + 'static,
    M: ObjectType + 'static,
    S: SubscriptionType + 'static,
{
    for rule in rules {
        builder = match rule {
            ValidationRule::DisableIntrospection => builder.disable_introspection(),
            ValidationRule::QueryComplexity(limit) => builder.limit_complexity(*limit as usize),
            ValidationRule::QueryDepth(limit) => builder.limit_depth(*limit as usize),
            ValidationRule::Default(_) | ValidationRule::Custom(_) => builder,
        };
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_cover_all_names() {
        let rules = default_rules();
        assert_eq!(rules.len(), DEFAULT_RULE_NAMES.len());
        assert!(rules.contains(&ValidationRule::Default("ScalarLeafs")));
    }

    #[test]
    fn test_rule_source_list() {
        let source = RuleSource::List(vec![ValidationRule::QueryDepth(5)]);
        assert_eq!(
            source.rules_for(OperationType::Query, "{ products { name } }"),
            vec![ValidationRule::QueryDepth(5)]
        );
    }

    #[test]
    fn test_rule_source_factory_sees_operation() {
        let source = RuleSource::Factory(Arc::new(|operation, _query| {
            if operation == OperationType::Mutation {
                vec![ValidationRule::QueryComplexity(10)]
            } else {
                Vec::new()
            }
        }));

        assert!(source.rules_for(OperationType::Query, "{ me }").is_empty());
        assert_eq!(
            source.rules_for(OperationType::Mutation, "mutation { logout }"),
            vec![ValidationRule::QueryComplexity(10)]
        );
    }

    #[test]
    fn test_rule_display() {
        assert_eq!(ValidationRule::QueryDepth(7).to_string(), "QueryDepth(7)");
        assert_eq!(
            ValidationRule::Default("ScalarLeafs").to_string(),
            "ScalarLeafs"
        );
    }
}
