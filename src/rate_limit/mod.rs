//! Distributed rate limiting.
//!
//! # Data Flow
//! ```text
//! (identity, route class)
//!     → key.rs (QuotaKey → store key)
//!     → engine.rs (increment, first-hit expiry, compare to limit)
//!     → store.rs (CounterStore: redis_store.rs shared, memory_store.rs local)
//!     → decision.rs (AdmissionDecision + quota headers)
//! ```
//!
//! # Design Decisions
//! - Fixed window counter; the store's atomic increment is the only
//!   correctness-critical primitive
//! - No in-process locking for quotas, ownership lives in the store
//! - Fail open: a store outage admits traffic and flags the decision

pub mod decision;
pub mod engine;
pub mod key;
pub mod memory_store;
pub mod redis_store;
pub mod store;

pub use decision::AdmissionDecision;
pub use engine::{QuotaConfig, RateLimitEngine};
pub use key::{QuotaKey, ANONYMOUS};
pub use memory_store::MemoryCounterStore;
pub use redis_store::RedisCounterStore;
pub use store::{CounterStore, StoreError};

use std::sync::Arc;

use crate::config::{StoreBackend, StoreConfig};

/// Open the configured counter store.
///
/// Redis is connected eagerly so an unreachable server fails startup; later
/// outages are handled per request by failing open.
pub async fn connect_store(config: &StoreConfig) -> Result<Arc<dyn CounterStore>, StoreError> {
    match config.backend {
        StoreBackend::Redis => {
            let store = RedisCounterStore::connect(&config.redis_url).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory counter store, quotas are not shared between instances");
            Ok(Arc::new(MemoryCounterStore::new()))
        }
    }
}
