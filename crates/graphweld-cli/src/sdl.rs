//! Schema SDL export
//!
//! Dumps a schema in SDL form with fields, arguments and enum items sorted,
//! so two dumps of the same schema are always byte-identical and diffs stay
//! readable. The subscription root is suppressed: subscriptions are not
//! served over the plain HTTP endpoint, so they do not belong in the dumped
//! contract.

use async_graphql::{ObjectType, SDLExportOptions, Schema, SubscriptionType};

/// Export the schema as sorted SDL, without the subscription root.
pub fn export_sdl<Q, M, S>(schema: &Schema<Q, M, S>) -> String
where
    Q: ObjectType + 'static,
    M: ObjectType + 'static,
    S: SubscriptionType + 'static,
{
    let sdl = schema.sdl_with_options(
        SDLExportOptions::new()
            .sorted_fields()
            .sorted_arguments()
            .sorted_enum_items(),
    );
    strip_subscription(&sdl)
}

/// Remove the subscription type block and its schema-block entry from an
/// SDL document.
pub fn strip_subscription(sdl: &str) -> String {
    let mut lines = Vec::new();
    let mut in_subscription_block = false;

    for line in sdl.lines() {
        if in_subscription_block {
            if line.trim() == "}" {
                in_subscription_block = false;
            }
            continue;
        }

        let trimmed = line.trim();
        if trimmed.starts_with("type Subscription {") || trimmed == "type Subscription" {
            in_subscription_block = true;
            continue;
        }
        if trimmed.starts_with("subscription:") {
            continue;
        }
        lines.push(line);
    }

    let mut output = lines.join("\n");
    // The removed block leaves doubled blank lines behind
    while output.contains("\n\n\n") {
        output = output.replace("\n\n\n", "\n\n");
    }
    if !output.ends_with('\n') {
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
type Query {
  products: [Product!]!
}

type Subscription {
  productUpdates: Product!
}

schema {
  query: Query
  subscription: Subscription
}
";

    #[test]
    fn test_strip_removes_type_block_and_schema_entry() {
        let stripped = strip_subscription(SAMPLE);
        assert!(!stripped.contains("Subscription"));
        assert!(stripped.contains("type Query"));
        assert!(stripped.contains("query: Query"));
    }

    #[test]
    fn test_strip_is_a_noop_without_subscriptions() {
        let sdl = "type Query {\n  ping: String!\n}\n";
        assert_eq!(strip_subscription(sdl), sdl);
    }

    #[test]
    fn test_strip_leaves_no_doubled_blank_lines() {
        let stripped = strip_subscription(SAMPLE);
        assert!(!stripped.contains("\n\n\n"));
    }
}
