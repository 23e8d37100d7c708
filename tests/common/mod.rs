//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use admission_gateway::clock::ManualClock;
use admission_gateway::config::{GatewayConfig, RouteConfig, StoreBackend};
use admission_gateway::http::HttpServer;
use admission_gateway::rate_limit::{CounterStore, MemoryCounterStore, StoreError};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Json, Router,
};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-signing-key-0123456789";

/// Wall-clock start for every test clock.
pub const NOW: u64 = 1_750_000_000;

/// Sign `claims` with the test key (HS256).
pub fn mint_token(claims: Value) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

/// A token for `customer_id` valid for an hour after [`NOW`].
pub fn customer_token(customer_id: &str, username: &str) -> String {
    mint_token(json!({
        "sub": username,
        "customerId": customer_id,
        "exp": NOW + 3600,
    }))
}

/// Upstream that answers every request with what it received.
pub async fn start_echo_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new().fallback(|request: Request<Body>| async move {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Json(json!({
            "path": request.uri().path(),
            "customer_id": header("x-customer-id"),
            "username": header("x-username"),
            "request_id": header("x-request-id"),
        }))
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Gateway config routing `/api/orders` and `/api/auth` to `upstream`.
pub fn test_config(upstream: SocketAddr, limit: u64) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.auth.signing_key = SECRET.to_string();
    config.rate_limit.requests_per_window = limit;
    config.store.backend = StoreBackend::Memory;
    config.routes = vec![
        RouteConfig {
            name: "order-service".to_string(),
            path_prefix: "/api/orders".to_string(),
            upstream: upstream.to_string(),
            priority: 10,
        },
        RouteConfig {
            name: "auth-service".to_string(),
            path_prefix: "/api/auth".to_string(),
            upstream: upstream.to_string(),
            priority: 10,
        },
    ];
    config
}

/// Everything a test needs to drive one gateway instance.
pub struct TestGateway {
    pub router: Router,
    pub store: MemoryCounterStore,
    pub clock: ManualClock,
}

impl TestGateway {
    /// Gateway over an in-memory store, both on a manual clock at [`NOW`].
    pub fn new(config: GatewayConfig) -> Self {
        let clock = ManualClock::at_unix(NOW);
        let store = MemoryCounterStore::with_clock(Arc::new(clock.clone()));
        let server =
            HttpServer::with_clock(config, Arc::new(store.clone()), Arc::new(clock.clone()))
                .unwrap();
        Self {
            router: server.router(),
            store,
            clock,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        send(&self.router, request).await
    }
}

/// Gateway over an arbitrary store, on a manual clock at [`NOW`].
pub fn gateway_with_store(config: GatewayConfig, store: Arc<dyn CounterStore>) -> Router {
    let clock = ManualClock::at_unix(NOW);
    HttpServer::with_clock(config, store, Arc::new(clock))
        .unwrap()
        .router()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn get(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Let detached tasks (expiry scheduling) run.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(5)).await;
}

/// Counter store whose every call fails.
#[derive(Debug, Default)]
pub struct FailingStore {
    pub calls: AtomicUsize,
}

#[async_trait]
impl CounterStore for FailingStore {
    async fn increment(&self, _key: &str) -> Result<u64, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn set_expiry(&self, _key: &str, _ttl: Duration) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}
