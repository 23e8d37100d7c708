//! Process-level errors surfaced by [`crate::run`].

use thiserror::Error;

use crate::config::ConfigError;
use crate::pipeline::PipelineError;
use crate::rate_limit::StoreError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("counter store error: {0}")]
    Store(#[from] StoreError),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("invalid {field} address '{value}'")]
    Address { field: &'static str, value: String },

    #[error("metrics exporter error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
