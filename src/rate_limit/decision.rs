//! Admission decisions and the quota headers derived from them.

use axum::http::{HeaderMap, HeaderValue};
use serde::Serialize;

use crate::pipeline::headers::{
    X_RATELIMIT_ERROR, X_RATELIMIT_LIMIT, X_RATELIMIT_REMAINING, X_RATELIMIT_RESET,
};

/// Outcome of one rate-limit check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdmissionDecision {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
    /// Window length in seconds.
    pub reset_secs: u64,
    /// Post-increment count, zero when the store failed.
    pub count: u64,
    pub identity: String,
    pub route_class: String,
    /// The store could not be reached and the request was let through.
    pub store_error: bool,
}

impl AdmissionDecision {
    /// Decision for a store that answered with `count`.
    pub fn from_count(
        identity: &str,
        route_class: &str,
        count: u64,
        limit: u64,
        window_secs: u64,
    ) -> Self {
        Self {
            allowed: count <= limit,
            limit,
            remaining: limit.saturating_sub(count),
            reset_secs: window_secs,
            count,
            identity: identity.to_string(),
            route_class: route_class.to_string(),
            store_error: false,
        }
    }

    /// Fail-open decision used when the store is unavailable.
    pub fn store_unavailable(identity: &str, route_class: &str, limit: u64, window_secs: u64) -> Self {
        Self {
            allowed: true,
            limit,
            remaining: limit,
            reset_secs: window_secs,
            count: 0,
            identity: identity.to_string(),
            route_class: route_class.to_string(),
            store_error: true,
        }
    }

    /// Write the quota status headers, replacing any existing values.
    ///
    /// A store failure yields only `X-RateLimit-Error: true`.
    pub fn apply_headers(&self, headers: &mut HeaderMap) {
        if self.store_error {
            headers.insert(X_RATELIMIT_ERROR, HeaderValue::from_static("true"));
            return;
        }

        headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(self.limit));
        headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(self.remaining));
        headers.insert(X_RATELIMIT_RESET, HeaderValue::from(self.reset_secs));
    }
}
