//! # Per-Key Locks
//!
//! A table of async mutexes, one per store key, so read-modify-write on a
//! sequence never interleaves with another update of the same key.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  append(miner_messages_a) ──► lock "miner_messages_a" ──► get/put      │
//! │  append(miner_messages_a) ──► waits ───────────────────►  get/put      │
//! │  append(miner_messages_b) ──► lock "miner_messages_b" ──► get/put      │
//! │                                (independent of key a)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entries nobody holds are pruned once the table grows past
//! `PRUNE_THRESHOLD`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::sync::{Mutex, OwnedMutexGuard};

const PRUNE_THRESHOLD: usize = 1024;

/// Table of per-key async mutexes.
#[derive(Debug, Default)]
pub struct KeyLocks {
    table: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// Held while a key is being updated. Releases on drop.
#[derive(Debug)]
pub struct KeyGuard {
    _guard: OwnedMutexGuard<()>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other holder has `key`, then returns its guard.
    pub async fn lock(&self, key: &str) -> KeyGuard {
        let mutex = {
            let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            if table.len() >= PRUNE_THRESHOLD {
                table.retain(|_, m| Arc::strong_count(m) > 1);
            }
            table.entry(key.to_string()).or_default().clone()
        };

        KeyGuard {
            _guard: mutex.lock_owned().await,
        }
    }

    /// Number of keys in the table, held or not.
    pub fn len(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = Arc::new(KeyLocks::new());
        let guard = locks.lock("a").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.lock("a").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = KeyLocks::new();
        let _a = locks.lock("a").await;
        let _b = tokio::time::timeout(Duration::from_secs(1), locks.lock("b"))
            .await
            .expect("lock on another key should not wait");
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_idle_entries_are_pruned() {
        let locks = KeyLocks::new();
        for i in 0..PRUNE_THRESHOLD {
            let _g = locks.lock(&format!("k{}", i)).await;
        }
        assert_eq!(locks.len(), PRUNE_THRESHOLD);

        let _held = locks.lock("fresh").await;
        assert_eq!(locks.len(), 1);
    }
}
