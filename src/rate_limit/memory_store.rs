//! Process-local counter store.
//!
//! Mirrors Redis `INCR`/`EXPIRE` semantics on a `DashMap`, with lazy expiry:
//! an entry whose deadline has passed is treated as absent on the next
//! access. Counters are not shared between processes, so this store is only
//! correct for a single gateway instance (and for tests).

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::clock::{Clock, SystemClock};
use crate::rate_limit::store::{CounterStore, StoreError};

#[derive(Debug, Clone, Copy)]
struct Counter {
    count: u64,
    expires_at: Option<SystemTime>,
}

impl Counter {
    fn is_expired(&self, now: SystemTime) -> bool {
        matches!(self.expires_at, Some(deadline) if now >= deadline)
    }
}

/// In-memory [`CounterStore`].
#[derive(Debug, Clone)]
pub struct MemoryCounterStore {
    counters: Arc<DashMap<String, Counter>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            counters: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Current live count for `key`, if any.
    pub fn count(&self, key: &str) -> Option<u64> {
        let now = self.clock.now();
        self.counters
            .get(key)
            .filter(|c| !c.is_expired(now))
            .map(|c| c.count)
    }

    /// Remaining time to live for `key`, `None` if absent or without expiry.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now();
        self.counters
            .get(key)
            .filter(|c| !c.is_expired(now))
            .and_then(|c| c.expires_at)
            .map(|deadline| deadline.duration_since(now).unwrap_or_default())
    }

    /// Drop expired entries.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.counters.len();
        self.counters.retain(|_, c| !c.is_expired(now));
        before - self.counters.len()
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

impl Default for MemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment(&self, key: &str) -> Result<u64, StoreError> {
        let now = self.clock.now();
        // The entry guard holds the shard lock, making read-modify-write atomic.
        let mut entry = self.counters.entry(key.to_string()).or_insert(Counter {
            count: 0,
            expires_at: None,
        });
        if entry.is_expired(now) {
            *entry = Counter {
                count: 0,
                expires_at: None,
            };
        }
        entry.count += 1;
        Ok(entry.count)
    }

    async fn set_expiry(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let now = self.clock.now();
        if let Some(mut entry) = self.counters.get_mut(key) {
            if !entry.is_expired(now) {
                entry.expires_at = Some(now + ttl);
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
