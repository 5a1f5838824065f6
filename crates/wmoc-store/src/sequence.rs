//! # Sequence Store
//!
//! Ordered JSON sequences kept under single store keys, with every
//! mutation serialized per key and a sliding retention window.
//!
//! ## Read-Modify-Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  append(key, item)                                                      │
//! │    1. lock key                                                          │
//! │    2. get(key)            → "[a, b]"   (absent → [])                    │
//! │    3. push item           → [a, b, item]                                │
//! │    4. put(key, ..., ttl)  ← every write restarts the retention window   │
//! │    5. unlock                                                            │
//! │                                                                         │
//! │  pop_front(key)                                                         │
//! │    empty  → None, nothing written                                       │
//! │    [h, t..] → put(key, [t..], ttl), Some(h)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{trace, warn};

use crate::error::{StoreError, StoreResult};
use crate::locks::KeyLocks;
use crate::traits::ExpiringStore;

/// JSON sequences over an [`ExpiringStore`].
pub struct SequenceStore {
    store: Arc<dyn ExpiringStore>,
    locks: KeyLocks,
    ttl: Duration,
}

impl std::fmt::Debug for SequenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceStore")
            .field("backend", &self.store.backend_name())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SequenceStore {
    pub fn new(store: Arc<dyn ExpiringStore>, ttl: Duration) -> Self {
        Self {
            store,
            locks: KeyLocks::new(),
            ttl,
        }
    }

    /// Retention window applied on every write.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Returns the whole sequence, oldest first. Absent or expired is empty.
    pub async fn read<T>(&self, key: &str) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.load(key).await
    }

    /// Appends `item` at the tail and returns the new length.
    pub async fn append<T>(&self, key: &str, item: T) -> StoreResult<usize>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let _guard = self.locks.lock(key).await;

        let mut items: Vec<T> = self.load(key).await?;
        items.push(item);
        self.save(key, &items).await?;

        trace!(key, len = items.len(), "Appended to sequence");
        Ok(items.len())
    }

    /// Removes and returns the head. An empty sequence is left untouched.
    pub async fn pop_front<T>(&self, key: &str) -> StoreResult<Option<T>>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let _guard = self.locks.lock(key).await;

        let mut items: Vec<T> = self.load(key).await?;
        if items.is_empty() {
            return Ok(None);
        }

        let head = items.remove(0);
        self.save(key, &items).await?;

        trace!(key, remaining = items.len(), "Popped sequence head");
        Ok(Some(head))
    }

    /// Removes the sequence entirely.
    pub async fn clear(&self, key: &str) -> StoreResult<()> {
        let _guard = self.locks.lock(key).await;
        self.store.forget(key).await
    }

    async fn load<T>(&self, key: &str) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        match self.store.get(key).await? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                warn!(key, error = %e, "Stored sequence does not decode");
                StoreError::corrupt(key, e)
            }),
        }
    }

    async fn save<T>(&self, key: &str, items: &[T]) -> StoreResult<()>
    where
        T: Serialize + Sync,
    {
        let raw = serde_json::to_string(items)?;
        self.store.put(key, raw, self.ttl).await
    }
}
