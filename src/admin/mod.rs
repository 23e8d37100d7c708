//! Read-only admin API, served on its own listener.
//!
//! - `GET /admin/status`: version, uptime, counter store, pipeline stages
//! - `GET /admin/rate-limit`: quota in force and excluded paths
//! - `GET /admin/routes`: compiled route table

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/rate-limit", get(get_rate_limit))
        .route("/admin/routes", get(get_routes))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
