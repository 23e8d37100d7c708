//! Redis-backed counter store.
//!
//! Counters live in Redis so every gateway instance sees the same count:
//! - `INCR key` is the atomic increment-and-read
//! - `EXPIRE key ttl` makes Redis delete the key when the window ends
//!
//! The connection is a `redis::aio::ConnectionManager`, which multiplexes
//! commands over one connection and reconnects on its own. Connect and read
//! timeouts are whatever the client is configured with; this module adds none.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::rate_limit::store::{CounterStore, StoreError};

/// [`CounterStore`] over a shared Redis instance.
#[derive(Clone)]
pub struct RedisCounterStore {
    connection: ConnectionManager,
}

impl fmt::Debug for RedisCounterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCounterStore").finish_non_exhaustive()
    }
}

impl RedisCounterStore {
    /// Connect to Redis.
    ///
    /// # Arguments
    /// * `url` - Redis connection URL (e.g., "redis://127.0.0.1/")
    ///
    /// # Errors
    /// Returns error if the URL is invalid or the first connection fails.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!(url = %url, "Connected to Redis counter store");
        Ok(Self { connection })
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.connection.clone();
        let count: u64 = conn.incr(key, 1u64).await?;
        Ok(count)
    }

    async fn set_expiry(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let _: () = conn.expire(key, secs).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
