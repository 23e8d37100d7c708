//! Fixed-window rate limit engine.
//!
//! ```text
//! check(identity, route_class)
//!     → INCR  rate_limit:customer:{identity}:route:{route_class}
//!     → count == 1 ? spawn EXPIRE key window_secs
//!     → allowed = count <= limit
//! ```
//!
//! The expiry is set by a detached task so the current request never waits
//! on it, and its outcome never changes the current decision. If that task
//! never completes (crash, store error) the key keeps counting with no TTL
//! until something sets one; the increment and the expiry are two separate
//! store operations and this gap is not closed here.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::RateLimitConfig;
use crate::observability::metrics;
use crate::rate_limit::decision::AdmissionDecision;
use crate::rate_limit::key::QuotaKey;
use crate::rate_limit::store::CounterStore;

/// Process-wide quota settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaConfig {
    pub limit: u64,
    pub window_secs: u64,
}

/// Decides admit/reject per (identity, route class) against a shared store.
///
/// Holds no quota state of its own; all counting happens in the store.
pub struct RateLimitEngine {
    store: Arc<dyn CounterStore>,
    quota: QuotaConfig,
    key_prefix: String,
}

impl std::fmt::Debug for RateLimitEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitEngine")
            .field("store", &self.store.name())
            .field("quota", &self.quota)
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}

impl RateLimitEngine {
    pub fn new(store: Arc<dyn CounterStore>, config: &RateLimitConfig) -> Self {
        Self {
            store,
            quota: QuotaConfig {
                limit: config.requests_per_window,
                window_secs: config.window_secs,
            },
            key_prefix: config.key_prefix.clone(),
        }
    }

    /// The limit and window every bucket is held to.
    pub fn current_config(&self) -> QuotaConfig {
        self.quota
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    /// Count one request against `(identity, route_class)` and decide.
    ///
    /// Never rejects because of a store failure: an unreachable store yields
    /// an allowed decision with `store_error` set.
    pub async fn check(&self, identity: &str, route_class: &str) -> AdmissionDecision {
        let key = QuotaKey::new(identity, route_class);
        let storage_key = key.storage_key(&self.key_prefix);

        let count = match self.store.increment(&storage_key).await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(
                    quota_key = %key,
                    store = self.store.name(),
                    error = %e,
                    "Counter store unavailable, admitting request"
                );
                metrics::record_store_error("increment");
                return AdmissionDecision::store_unavailable(
                    identity,
                    route_class,
                    self.quota.limit,
                    self.quota.window_secs,
                );
            }
        };

        if count == 1 {
            self.schedule_expiry(storage_key);
        }

        let decision = AdmissionDecision::from_count(
            identity,
            route_class,
            count,
            self.quota.limit,
            self.quota.window_secs,
        );

        if decision.allowed {
            tracing::debug!(
                quota_key = %key,
                count = count,
                limit = self.quota.limit,
                "Rate limit check passed"
            );
        } else {
            tracing::warn!(
                quota_key = %key,
                count = count,
                limit = self.quota.limit,
                "Rate limit exceeded"
            );
        }

        decision
    }

    /// Set the window TTL on a freshly created counter without blocking the caller.
    fn schedule_expiry(&self, storage_key: String) {
        let store = Arc::clone(&self.store);
        let ttl = Duration::from_secs(self.quota.window_secs);

        // Detached: the request's response never waits on this.
        tokio::spawn(async move {
            match store.set_expiry(&storage_key, ttl).await {
                Ok(()) => {
                    tracing::trace!(key = %storage_key, ttl_secs = ttl.as_secs(), "Counter expiry set");
                }
                Err(e) => {
                    tracing::warn!(
                        key = %storage_key,
                        error = %e,
                        "Failed to set counter expiry"
                    );
                    metrics::record_store_error("expire");
                }
            }
        });
    }
}
