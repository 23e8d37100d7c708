use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;
use crate::rate_limit::QuotaConfig;
use crate::routing::RouteSummary;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub uptime_secs: u64,
    pub counter_store: &'static str,
    pub stages: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct RateLimitStatus {
    pub enabled: bool,
    #[serde(flatten)]
    pub quota: QuotaConfig,
    pub key_prefix: String,
    pub excluded_paths: Vec<String>,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        uptime_secs: state.started_at.elapsed().as_secs(),
        counter_store: state.engine.store_name(),
        stages: state.pipeline.stage_names(),
    })
}

pub async fn get_rate_limit(State(state): State<AppState>) -> Json<RateLimitStatus> {
    let config = &state.config.rate_limit;
    Json(RateLimitStatus {
        enabled: config.enabled,
        quota: state.engine.current_config(),
        key_prefix: config.key_prefix.clone(),
        excluded_paths: config.excluded_paths.clone(),
    })
}

pub async fn get_routes(State(state): State<AppState>) -> Json<Vec<RouteSummary>> {
    Json(state.router.summaries())
}
