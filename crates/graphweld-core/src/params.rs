//! Resolver parameter resolution
//!
//! Resolvers that want access to the originating HTTP request declare a
//! request parameter and resolve it through [`RequestParameter`]. Resolution
//! fails with an integration error when execution was started outside an HTTP
//! request, e.g. from the schema-dump command.

use std::sync::Arc;

use crate::context::RequestContext;
use crate::error::{Error, Result};

/// Resolves the originating HTTP request out of the execution context.
pub struct RequestParameter;

impl RequestParameter {
    /// Fetch the request context stored in the execution data.
    ///
    /// Returns an integration error when no request context was injected,
    /// which happens when the schema is executed outside the HTTP adapter.
    pub fn resolve_request<'a>(
        ctx: &'a async_graphql::Context<'_>,
    ) -> Result<&'a Arc<RequestContext>> {
        ctx.data_opt::<Arc<RequestContext>>().ok_or_else(|| {
            Error::integration(
                "The request object is not available in this execution context. \
                 Request parameters can only be resolved for operations executed \
                 through the HTTP adapter.",
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::demo::{SecurityServices, demo_schema};
    use crate::server::ServerConfig;

    #[tokio::test]
    async fn test_execution_without_a_request_is_an_integration_error() {
        // Executed directly, the way the schema-dump command would, no
        // request context is injected and the parameter cannot resolve
        let services = SecurityServices::demo().unwrap();
        let schema = demo_schema(&services, &ServerConfig::new());

        let response = schema.execute("{ requestMethod }").await;
        assert_eq!(response.errors.len(), 1);
        assert!(
            response.errors[0]
                .message
                .contains("request object is not available"),
            "{}",
            response.errors[0].message
        );
    }
}
