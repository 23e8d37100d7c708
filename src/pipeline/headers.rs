//! Header names owned by the admission pipeline.

use axum::http::HeaderName;

/// Caller identity, set by the authentication stage for upstream services.
pub const X_CUSTOMER_ID: HeaderName = HeaderName::from_static("x-customer-id");

/// Caller display name, set by the authentication stage.
pub const X_USERNAME: HeaderName = HeaderName::from_static("x-username");

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Replaces the numeric quota headers when the counter store failed.
pub const X_RATELIMIT_ERROR: HeaderName = HeaderName::from_static("x-ratelimit-error");

/// Prefix of a bearer credential in the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";
