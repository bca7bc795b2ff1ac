//! Route registration
//!
//! The bundle exposes exactly one route, `/graphql`, accepting GET and POST.
//! Debug builds additionally serve an interactive playground on `/graphiql`.

use axum::Router;
use axum::routing::get;

use crate::handler::{GraphQLState, graphql_handler};

/// The GraphQL endpoint path.
pub const GRAPHQL_PATH: &str = "/graphql";

/// Build the router for the GraphQL endpoint.
pub fn router(state: GraphQLState) -> Router {
    let router = Router::new().route(GRAPHQL_PATH, get(graphql_handler).post(graphql_handler));

    #[cfg(debug_assertions)]
    let router = router.route("/graphiql", get(playground));

    router.with_state(state)
}

#[cfg(debug_assertions)]
async fn playground() -> axum::response::Html<String> {
    use async_graphql::http::{GraphQLPlaygroundConfig, playground_source};
    axum::response::Html(playground_source(GraphQLPlaygroundConfig::new(GRAPHQL_PATH)))
}
