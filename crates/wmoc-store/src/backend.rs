//! # Backend Selection
//!
//! Configuration and construction of the store backend.
//!
//! ## Backend Matrix
//! ```text
//! ┌──────────┬────────────────────────────┬────────────────────────────────┐
//! │ Backend  │ Survives restart           │ Shared across relay processes  │
//! ├──────────┼────────────────────────────┼────────────────────────────────┤
//! │ memory   │ no                         │ no                             │
//! │ redis    │ yes (per Redis persistence)│ yes (updates may still race)   │
//! └──────────┴────────────────────────────┴────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::memory::MemoryStore;
use crate::redis_store::RedisStore;
use crate::traits::ExpiringStore;

/// Which backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Memory,
    Redis,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Redis => "redis",
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreBackend {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "redis" => Ok(StoreBackend::Redis),
            other => Err(StoreError::InvalidConfig(format!(
                "unknown store backend '{}', expected 'memory' or 'redis'",
                other
            ))),
        }
    }
}

/// Store configuration, the `[store]` section of the relay config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Only used by the redis backend.
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Prepended to every Redis key. Ignored by the memory backend.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_key_prefix() -> String {
    "wmoc:".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            redis_url: default_redis_url(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl StoreConfig {
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            backend: StoreBackend::Redis,
            redis_url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.backend == StoreBackend::Redis {
            let url = self.redis_url.trim();
            if !(url.starts_with("redis://") || url.starts_with("rediss://")) {
                return Err(StoreError::InvalidConfig(
                    "redis_url must start with redis:// or rediss://".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Opens the configured backend.
///
/// A Redis backend that cannot be reached is an error; there is no silent
/// fallback to memory.
pub async fn open_store(config: &StoreConfig) -> StoreResult<Arc<dyn ExpiringStore>> {
    config.validate()?;

    let store: Arc<dyn ExpiringStore> = match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory store; state is lost on restart");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Redis => {
            Arc::new(RedisStore::connect(config.redis_url.trim(), config.key_prefix.clone()).await?)
        }
    };

    Ok(store)
}
