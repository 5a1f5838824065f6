//! # In-Memory Backend
//!
//! A process-local `ExpiringStore`. Used for development, tests, and
//! single-instance deployments where losing state on restart is acceptable.
//!
//! ## Expiry
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  put(k, v, ttl)  →  Slot { value: v, expires_at: now + ttl }           │
//! │                                                                         │
//! │  get(k)          →  Some(v) if now < expires_at, else None              │
//! │                     (expired slots are invisible before removal)        │
//! │                                                                         │
//! │  every SWEEP_EVERY writes → drop all expired slots                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deadlines use `tokio::time::Instant`, so tests can drive expiry with a
//! paused clock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::error::StoreResult;
use crate::traits::ExpiringStore;

/// Writes between full sweeps of expired slots.
const SWEEP_EVERY: u64 = 256;

/// Fallback lifetime when `now + ttl` overflows the clock.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

#[derive(Debug)]
struct Slot {
    value: String,
    expires_at: Instant,
}

impl Slot {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Process-local expiring store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<String, Slot>>,
    writes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently reachable.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.slots
            .read()
            .await
            .values()
            .filter(|slot| slot.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Removes every expired slot and returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut slots = self.slots.write().await;
        let before = slots.len();
        slots.retain(|_, slot| slot.is_live(now));
        let purged = before - slots.len();
        if purged > 0 {
            debug!(purged, remaining = slots.len(), "Purged expired slots");
        }
        purged
    }

    fn deadline(now: Instant, ttl: Duration) -> Instant {
        now.checked_add(ttl).unwrap_or(now + FAR_FUTURE)
    }
}

#[async_trait]
impl ExpiringStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let now = Instant::now();
        let slots = self.slots.read().await;
        Ok(slots
            .get(key)
            .filter(|slot| slot.is_live(now))
            .map(|slot| slot.value.clone()))
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> StoreResult<()> {
        let now = Instant::now();
        {
            let mut slots = self.slots.write().await;
            if ttl.is_zero() {
                slots.remove(key);
            } else {
                slots.insert(
                    key.to_string(),
                    Slot {
                        value,
                        expires_at: Self::deadline(now, ttl),
                    },
                );
            }
        }

        if self.writes.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY == SWEEP_EVERY - 1 {
            self.purge_expired().await;
        }
        Ok(())
    }

    async fn forget(&self, key: &str) -> StoreResult<()> {
        self.slots.write().await.remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
