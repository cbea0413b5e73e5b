//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, get, StubGateway};
use herald_db::in_memory_pool;

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let pool = in_memory_pool().await.unwrap();
    let app = common::build_test_app(pool, Arc::new(StubGateway::default()));

    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
}

#[tokio::test]
async fn health_check_reports_degraded_when_pool_closed() {
    let pool = in_memory_pool().await.unwrap();
    let app = common::build_test_app(pool.clone(), Arc::new(StubGateway::default()));
    pool.close().await;

    let json = body_json(get(app, "/health").await).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let pool = in_memory_pool().await.unwrap();
    let app = common::build_test_app(pool, Arc::new(StubGateway::default()));

    let response = get(app, "/this-route-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Not Found");
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let pool = in_memory_pool().await.unwrap();
    let app = common::build_test_app(pool, Arc::new(StubGateway::default()));

    let response = get(app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}
