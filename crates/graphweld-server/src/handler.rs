//! The `/graphql` request handler
//!
//! Terminates the HTTP boundary for the single GraphQL route: converts the
//! native request into the execution library's transport shape (including
//! multipart upload normalization), injects a fresh request context into
//! every operation, executes, and maps the outcome onto an HTTP status.
//! No GraphQL semantics live here.

use std::sync::Arc;

use async_graphql::BatchRequest;
use async_graphql::http::{MultipartOptions, parse_query_string, receive_batch_body};
use axum::body::Body;
use axum::extract::{Request, State};
use axum::response::Response;
use http::{Method, StatusCode, header};
use serde_json::json;

use graphweld_core::{RequestContext, ServerConfig};

use crate::executor::GraphQLExecutor;
use crate::status;

/// Largest accepted request body.
const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Shared state of the GraphQL route.
#[derive(Clone)]
pub struct GraphQLState {
    pub executor: Arc<dyn GraphQLExecutor>,
    pub server_config: Arc<ServerConfig>,
}

impl GraphQLState {
    pub fn new(executor: Arc<dyn GraphQLExecutor>, server_config: Arc<ServerConfig>) -> Self {
        Self {
            executor,
            server_config,
        }
    }
}

/// Handle one request against the GraphQL endpoint.
pub async fn graphql_handler(State(state): State<GraphQLState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let batch = if parts.method == Method::GET {
        match parse_query_string(parts.uri.query().unwrap_or("")) {
            Ok(single) => BatchRequest::Single(single),
            Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
        }
    } else if parts.method == Method::POST {
        let bytes = match axum::body::to_bytes(body, MAX_BODY_SIZE).await {
            Ok(bytes) => bytes,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
        };
        let content_type = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());

        // An empty batch array carries no operation to execute and would be
        // coerced into a single empty request by the parser below
        if serde_json::from_slice::<serde_json::Value>(&bytes)
            .is_ok_and(|value| value.as_array().is_some_and(|batch| batch.is_empty()))
        {
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "empty GraphQL batch");
        }

        // receive_batch_body parses JSON bodies and normalizes multipart
        // uploads into ordinary bound variables
        match receive_batch_body(content_type, bytes.as_ref(), MultipartOptions::default()).await {
            Ok(batch) => batch,
            Err(e) => {
                tracing::debug!("Rejected unparseable GraphQL request: {}", e);
                return error_response(StatusCode::BAD_REQUEST, &e.to_string());
            }
        }
    } else {
        return error_response(
            StatusCode::METHOD_NOT_ALLOWED,
            &format!("Unsupported method: {}", parts.method),
        );
    };

    // One context per inbound HTTP request, shared by all operations of a
    // batch; the server configuration is cloned so request state never
    // leaks into the shared instance
    let context = Arc::new(RequestContext::new(parts));
    let scoped_config = state.server_config.per_request(Arc::clone(&context));

    let mut batch = batch;
    for operation in batch.iter_mut() {
        operation.data.insert(Arc::clone(&context));
        operation.data.insert(scoped_config.clone());
    }

    let response = state.executor.execute(batch).await;
    let status = status::decide_batch(&response);

    let body = match serde_json::to_vec(&response) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("Failed to serialize GraphQL response: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "serialization failure");
        }
    };

    json_response(status, body)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let body = json!({ "errors": [{ "message": message }] });
    json_response(status, body.to_string().into_bytes())
}

fn json_response(status: StatusCode, body: Vec<u8>) -> Response {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        // Infallible with a valid status and static header name
        .unwrap_or_else(|_| Response::new(Body::empty()))
}
