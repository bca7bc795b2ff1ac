//! Graphweld Server - HTTP adapter for the Graphweld bundle
//!
//! Provides the single GraphQL route:
//! - `POST /graphql` - Execute operations, single or batched, JSON or
//!   multipart
//! - `GET /graphql` - Execute an operation passed as query parameters
//! - `GET /graphiql` - Interactive playground (debug builds only)
//!
//! The adapter contains no GraphQL semantics: it normalizes transport,
//! attaches the per-request context and maps execution outcomes onto HTTP
//! status codes.

#![warn(clippy::all)]

pub mod executor;
pub mod handler;
pub mod routes;
pub mod status;

pub use executor::GraphQLExecutor;
pub use handler::{GraphQLState, graphql_handler};
pub use routes::router;
