//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require a signing key
//! - Validate value ranges (limits and windows > 0)
//! - Check that routes and excluded paths are well-formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{GatewayConfig, PLACEHOLDER_ADMIN_KEY};

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("auth.signing_key must be set")]
    MissingSigningKey,

    #[error("auth.identity_claim must not be empty")]
    EmptyIdentityClaim,

    #[error("rate_limit.requests_per_window must be greater than zero")]
    ZeroLimit,

    #[error("rate_limit.window_secs must be greater than zero")]
    ZeroWindow,

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: String, value: String },

    #[error("route `{0}` is defined more than once")]
    DuplicateRoute(String),

    #[error("{field} entry `{value}` must start with '/'")]
    InvalidPathPrefix { field: String, value: String },

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("admin.api_key must be changed from its default when the admin API is enabled")]
    PlaceholderAdminKey,
}

/// Validate a parsed configuration, collecting every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.auth.signing_key.trim().is_empty() {
        errors.push(ValidationError::MissingSigningKey);
    }
    if config.auth.identity_claim.trim().is_empty() {
        errors.push(ValidationError::EmptyIdentityClaim);
    }
    if config.rate_limit.requests_per_window == 0 {
        errors.push(ValidationError::ZeroLimit);
    }
    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::ZeroWindow);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.admin.enabled {
        check_address(&mut errors, "admin.bind_address", &config.admin.bind_address);
        let key = config.admin.api_key.trim();
        if key.is_empty() || key == PLACEHOLDER_ADMIN_KEY {
            errors.push(ValidationError::PlaceholderAdminKey);
        }
    }
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let mut names = HashSet::new();
    for route in &config.routes {
        if !names.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRoute(route.name.clone()));
        }
        check_prefix(&mut errors, "routes.path_prefix", &route.path_prefix);
        check_address(&mut errors, "routes.upstream", &route.upstream);
    }

    for prefix in &config.auth.excluded_paths {
        check_prefix(&mut errors, "auth.excluded_paths", prefix);
    }
    for prefix in &config.rate_limit.excluded_paths {
        check_prefix(&mut errors, "rate_limit.excluded_paths", prefix);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

fn check_prefix(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if !value.starts_with('/') {
        errors.push(ValidationError::InvalidPathPrefix {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}
