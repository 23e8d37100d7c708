//! Request-admission gateway.
//!
//! Authenticates bearer credentials, enforces a per-caller fixed-window quota
//! against a shared counter store, and forwards admitted requests upstream.

pub mod admin;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod rate_limit;
pub mod routing;

use std::net::SocketAddr;

use tokio::net::TcpListener;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

/// Start every listener for `config` and serve until `shutdown` fires.
///
/// Expects tracing to be initialized already.
pub async fn run(config: GatewayConfig, shutdown: Shutdown) -> Result<(), GatewayError> {
    config::validation::validate_config(&config).map_err(config::ConfigError::Validation)?;

    if config.observability.metrics_enabled {
        let addr = parse_addr("observability.metrics_address", &config.observability.metrics_address)?;
        observability::init_metrics(addr)?;
    }

    let store = rate_limit::connect_store(&config.store).await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let admin = config.admin.clone();
    let server = HttpServer::new(config, store)?;

    if admin.enabled {
        let admin_listener = TcpListener::bind(&admin.bind_address).await?;
        let app = admin::setup_admin_router(server.state().clone());
        let stop = shutdown.signalled();

        tracing::info!(address = %admin_listener.local_addr()?, "Admin API listening");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(admin_listener, app)
                .with_graceful_shutdown(stop)
                .await
            {
                tracing::error!(error = %e, "Admin server failed");
            }
        });
    }

    server.run(listener, shutdown.signalled()).await?;
    Ok(())
}

fn parse_addr(field: &'static str, value: &str) -> Result<SocketAddr, GatewayError> {
    value.parse().map_err(|_| GatewayError::Address {
        field,
        value: value.to_string(),
    })
}
