//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the shared application state from configuration
//! - Create the Axum router: admission pipeline in front of the forwarder
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve until the shutdown future resolves

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{body::Body, http::Request, Router};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::CredentialValidator;
use crate::clock::{Clock, SystemClock};
use crate::config::validation::validate_config;
use crate::config::{ConfigError, GatewayConfig};
use crate::error::GatewayError;
use crate::http::forward::forward_handler;
use crate::http::request_id::{request_id, MakeRequestUuid};
use crate::pipeline::{with_admission, AdmissionPipeline};
use crate::rate_limit::{CounterStore, RateLimitEngine};
use crate::routing::Router as RouteTable;

/// Application state shared by the forwarder and the admin API.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub router: Arc<RouteTable>,
    pub engine: Arc<RateLimitEngine>,
    pub pipeline: Arc<AdmissionPipeline>,
    pub client: Client<HttpConnector, Body>,
    pub started_at: Instant,
}

impl AppState {
    /// Validates `config` before building anything from it; an empty signing
    /// key would otherwise verify tokens signed with an empty secret.
    pub fn new(
        config: GatewayConfig,
        store: Arc<dyn CounterStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, GatewayError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let router = Arc::new(RouteTable::from_config(config.effective_routes()));
        let engine = Arc::new(RateLimitEngine::new(store, &config.rate_limit));
        let validator = Arc::new(CredentialValidator::with_clock(&config.auth, clock));
        let pipeline = Arc::new(AdmissionPipeline::from_config(
            &config,
            validator,
            engine.clone(),
            router.clone(),
        )?);

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            config: Arc::new(config),
            router,
            engine,
            pipeline,
            client,
            started_at: Instant::now(),
        })
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: GatewayConfig, store: Arc<dyn CounterStore>) -> Result<Self, GatewayError> {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    /// Like `new`, with the clock used for credential expiry checks.
    pub fn with_clock(
        config: GatewayConfig,
        store: Arc<dyn CounterStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, GatewayError> {
        let state = AppState::new(config, store, clock)?;
        let router = Self::build_router(state.clone());
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let timeout = Duration::from_secs(state.config.timeouts.request_secs);
        let pipeline = state.pipeline.clone();

        let app = Router::new().fallback(forward_handler).with_state(state);

        with_admission(app, pipeline).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        request_id = %request_id(request),
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(timeout)),
        )
    }

    /// The fully layered router, for serving or for in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve on `listener` until `shutdown` resolves, then drain.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            stages = ?self.state.pipeline.stage_names(),
            routes = self.state.router.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
