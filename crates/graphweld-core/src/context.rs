//! Per-request execution context
//!
//! The context carries the original HTTP request through GraphQL execution
//! so resolver code can inspect it without coupling the GraphQL layer to the
//! web framework. One context is created per inbound request, is immutable
//! after construction, and is discarded once the response is produced.

use http::request::Parts;

/// Request-scoped context wrapping the originating HTTP request.
///
/// Stored in the execution data of every operation of a request (single or
/// batched) and retrieved by resolvers through
/// [`RequestParameter`](crate::params::RequestParameter).
#[derive(Debug)]
pub struct RequestContext {
    parts: Parts,
}

impl RequestContext {
    /// Create a context from the head of the inbound request.
    pub fn new(parts: Parts) -> Self {
        Self { parts }
    }

    /// The originating request head, by reference.
    pub fn request(&self) -> &Parts {
        &self.parts
    }

    /// HTTP method of the originating request
    pub fn method(&self) -> &http::Method {
        &self.parts.method
    }

    /// URI of the originating request
    pub fn uri(&self) -> &http::Uri {
        &self.parts.uri
    }

    /// Headers of the originating request
    pub fn headers(&self) -> &http::HeaderMap {
        &self.parts.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn parts() -> Parts {
        let (parts, ()) = http::Request::builder()
            .method(http::Method::POST)
            .uri("/graphql?x=1")
            .header("x-request-id", "abc-123")
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn test_context_round_trip() {
        let context = Arc::new(RequestContext::new(parts()));

        // Retrieving the request from the context yields the very same
        // request the context was built from.
        let request = context.request();
        assert_eq!(request.method, http::Method::POST);
        assert_eq!(request.uri, "/graphql?x=1");
        assert!(std::ptr::eq(request, context.request()));
    }

    #[test]
    fn test_context_shared_by_reference() {
        let context = Arc::new(RequestContext::new(parts()));
        let clone = Arc::clone(&context);
        assert!(Arc::ptr_eq(&context, &clone));
    }

    #[test]
    fn test_context_accessors() {
        let context = RequestContext::new(parts());
        assert_eq!(context.method(), http::Method::POST);
        assert_eq!(context.uri().path(), "/graphql");
        assert_eq!(
            context.headers().get("x-request-id").unwrap(),
            "abc-123"
        );
    }
}
