//! HTTP status aggregation
//!
//! Maps GraphQL execution outcomes onto HTTP status codes: a fully or
//! partially successful operation is 200, an operation that produced no data
//! at all is 400. A batch answers with the worst status of its members; an
//! empty batch is a client error the transport maps to 500.

use async_graphql::{BatchResponse, Response, Value};
use http::StatusCode;

/// Status of a single operation outcome.
pub fn decide(response: &Response) -> StatusCode {
    if response.errors.is_empty() {
        return StatusCode::OK;
    }
    // Partial data still counts as a success; only a fully failed
    // operation becomes a client error
    if response.data == Value::Null {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    }
}

/// Status of a whole response, single or batched.
pub fn decide_batch(response: &BatchResponse) -> StatusCode {
    match response {
        BatchResponse::Single(single) => decide(single),
        BatchResponse::Batch(responses) => responses
            .iter()
            .map(decide)
            .max()
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
