//! Integration tests for the GraphQL HTTP adapter

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use graphweld_core::ServerConfig;
use graphweld_core::demo::{self, SecurityServices};
use graphweld_server::{GraphQLState, router};

fn app() -> (Router, SecurityServices) {
    let services = SecurityServices::demo().unwrap();
    let server_config = ServerConfig::new();
    let schema = demo::demo_http_schema(&services, &server_config);
    let state = GraphQLState::new(Arc::new(schema), Arc::new(server_config));
    (router(state), services)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_post_query() {
    let (app, _) = app();
    let response = app
        .oneshot(post_json(json!({"query": "{ products { name price } }"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap(),
        "application/json"
    );
    let body = body_json(response).await;
    assert_eq!(body["data"]["products"][0]["name"], "Mouf");
    assert!(body.get("errors").is_none());
}

#[tokio::test]
async fn test_get_query_parameters() {
    let (app, _) = app();
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/graphql?query=%7B%20products%20%7B%20name%20%7D%20%7D")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["products"][1]["name"], "Fenouil");
}

#[tokio::test]
async fn test_invalid_json_body_is_rejected() {
    let (app, _) = app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/graphql")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{ this is not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["errors"][0]["message"].is_string());
}

#[tokio::test]
async fn test_batch_status_is_the_maximum() {
    let (app, _) = app();
    let response = app
        .oneshot(post_json(json!([
            {"query": "{ products { name } }"},
            {"query": "{ nonexistentField }"},
            {"query": "{ contact { email } }"},
        ])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let batch = body.as_array().unwrap();
    assert_eq!(batch.len(), 3);
    assert!(batch[0].get("errors").is_none());
    assert!(batch[1]["errors"][0]["message"].is_string());
    assert!(batch[2].get("errors").is_none());
}

#[tokio::test]
async fn test_empty_batch_is_a_server_error() {
    let (app, _) = app();
    let response = app.oneshot(post_json(json!([]))).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_context_reaches_resolvers() {
    let (app, _) = app();
    let response = app
        .oneshot(post_json(json!({"query": "{ requestMethod }"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["requestMethod"], "POST");
}

#[tokio::test]
async fn test_login_then_me_across_requests() {
    let (app, services) = app();

    let response = app
        .clone()
        .oneshot(post_json(json!({
            "query": r#"mutation { login(userName: "admin", password: "secret") { username } }"#
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(services.token_storage.token().is_some());

    let response = app
        .oneshot(post_json(json!({"query": "{ me { username } }"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["me"]["username"], "admin");
}

#[tokio::test]
async fn test_unsupported_method() {
    let (app, _) = app();
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/graphql")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // The route only registers GET and POST
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
