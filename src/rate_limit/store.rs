//! Shared counter store interface.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Failure talking to the counter store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("counter store unavailable: {0}")]
    Unavailable(String),
}

/// Atomic counters with automatic expiry, shared by every gateway instance.
///
/// Implementations own connection handling and timeouts; callers treat any
/// error as "store unavailable".
#[async_trait]
pub trait CounterStore: Send + Sync + 'static {
    /// Increment `key` by one and return the post-increment value.
    ///
    /// Must be atomic across concurrent callers on every instance. A missing
    /// or expired key counts from zero.
    async fn increment(&self, key: &str) -> Result<u64, StoreError>;

    /// Schedule `key` for deletion after `ttl`.
    async fn set_expiry(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}
