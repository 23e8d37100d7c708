//! Admin API tests.

use std::sync::Arc;

use admission_gateway::admin::setup_admin_router;
use admission_gateway::http::HttpServer;
use admission_gateway::rate_limit::MemoryCounterStore;
use axum::{body::Body, http::Request, http::StatusCode, Router};

mod common;
use common::*;

const ADMIN_KEY: &str = "test-admin-key";

fn admin_router() -> Router {
    let upstream = "127.0.0.1:9".parse().unwrap();
    let mut config = test_config(upstream, 25);
    config.admin.api_key = ADMIN_KEY.to_string();
    let server = HttpServer::new(config, Arc::new(MemoryCounterStore::new())).unwrap();
    setup_admin_router(server.state().clone())
}

fn admin_get(path: &str, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(key) = key {
        builder = builder.header("authorization", format!("Bearer {key}"));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_admin_requires_api_key() {
    let router = admin_router();

    let res = send(&router, admin_get("/admin/status", None)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = send(&router, admin_get("/admin/status", Some("wrong"))).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_status() {
    let res = send(&admin_router(), admin_get("/admin/status", Some(ADMIN_KEY))).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "operational");
    assert_eq!(res.body["counter_store"], "memory");
    assert_eq!(res.body["stages"], serde_json::json!(["authenticate", "rate_limit"]));
}

#[tokio::test]
async fn test_rate_limit_reports_current_config() {
    let res = send(&admin_router(), admin_get("/admin/rate-limit", Some(ADMIN_KEY))).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["enabled"], true);
    assert_eq!(res.body["limit"], 25);
    assert_eq!(res.body["window_secs"], 60);
    assert_eq!(res.body["key_prefix"], "rate_limit");
    assert!(res.body["excluded_paths"]
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p == "/api/auth/login"));
}

#[tokio::test]
async fn test_routes() {
    let res = send(&admin_router(), admin_get("/admin/routes", Some(ADMIN_KEY))).await;

    assert_eq!(res.status, StatusCode::OK);
    let routes = res.body.as_array().unwrap();
    assert_eq!(routes.len(), 2);
    assert!(routes.iter().any(|r| r["name"] == "order-service" && r["path_prefix"] == "/api/orders"));
}
