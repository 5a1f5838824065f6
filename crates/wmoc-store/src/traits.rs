//! The expiring key-value contract every backend implements.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreResult;

/// A TTL-bounded string map.
///
/// Each call is atomic with respect to a single key. A value written with
/// `put(key, value, ttl)` becomes unreachable no later than `ttl` after the
/// call. Writers racing on the same key are not coordinated here; see
/// [`SequenceStore`](crate::SequenceStore) for serialized updates.
#[async_trait]
pub trait ExpiringStore: Send + Sync {
    /// Returns the current value, or `None` if absent or expired.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key` until `ttl` elapses. A zero TTL removes the key.
    async fn put(&self, key: &str, value: String, ttl: Duration) -> StoreResult<()>;

    /// Makes `key` unreachable immediately. Forgetting a missing key is a no-op.
    async fn forget(&self, key: &str) -> StoreResult<()>;

    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;

    /// Returns the current value, or `default` if absent or expired.
    async fn get_or(&self, key: &str, default: String) -> StoreResult<String> {
        Ok(self.get(key).await?.unwrap_or(default))
    }
}
