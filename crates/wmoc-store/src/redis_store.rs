//! # Redis Backend
//!
//! `ExpiringStore` over a shared Redis instance, for deployments where the
//! relay runs as more than one process or must survive restarts.
//!
//! ## Command Mapping
//! ```text
//! ┌──────────────────────────────┬──────────────────────────────────────────┐
//! │ ExpiringStore                │ Redis                                    │
//! ├──────────────────────────────┼──────────────────────────────────────────┤
//! │ get(k)                       │ GET  {prefix}k                           │
//! │ put(k, v, ttl)               │ SET  {prefix}k v EX ceil(ttl), min 1s    │
//! │ put(k, v, 0)                 │ DEL  {prefix}k                           │
//! │ forget(k)                    │ DEL  {prefix}k                           │
//! └──────────────────────────────┴──────────────────────────────────────────┘
//! ```
//!
//! The per-key locks in [`SequenceStore`](crate::SequenceStore) are
//! in-process only. Two relay processes sharing one Redis can still race.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::traits::ExpiringStore;

/// Redis-backed expiring store.
///
/// Cloning is cheap; `ConnectionManager` multiplexes one connection and
/// reconnects on failure.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    key_prefix: String,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Connects to Redis and verifies the connection.
    pub async fn connect(url: &str, key_prefix: impl Into<String>) -> StoreResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| StoreError::InvalidConfig(format!("bad redis url: {}", e)))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        let key_prefix = key_prefix.into();
        info!(key_prefix = %key_prefix, "Connected to Redis");

        Ok(Self { conn, key_prefix })
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    fn namespaced(&self, key: &str) -> String {
        namespaced_key(&self.key_prefix, key)
    }
}

fn namespaced_key(prefix: &str, key: &str) -> String {
    format!("{}{}", prefix, key)
}

/// Whole seconds for `EX`, rounded up, never below one.
fn ttl_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}

#[async_trait]
impl ExpiringStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(self.namespaced(key)).await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let key = self.namespaced(key);

        if ttl.is_zero() {
            let _: () = conn.del(&key).await?;
            return Ok(());
        }

        let secs = ttl_seconds(ttl);
        let _: () = conn.set_ex(&key, value, secs).await?;
        debug!(key = %key, ttl_secs = secs, "SET EX");
        Ok(())
    }

    async fn forget(&self, key: &str) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(self.namespaced(key)).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_seconds_rounds_up() {
        assert_eq!(ttl_seconds(Duration::from_secs(86_400)), 86_400);
        assert_eq!(ttl_seconds(Duration::from_millis(1_500)), 2);
        assert_eq!(ttl_seconds(Duration::from_millis(1)), 1);
    }

    #[test]
    fn test_namespaced_key() {
        assert_eq!(
            namespaced_key("wmoc:", "miner_messages_rig-7"),
            "wmoc:miner_messages_rig-7"
        );
        assert_eq!(namespaced_key("", "miner_commands_x"), "miner_commands_x");
    }

    #[tokio::test]
    async fn test_bad_url_is_config_error() {
        let err = RedisStore::connect("not a url", "wmoc:").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidConfig(_)));
    }
}
