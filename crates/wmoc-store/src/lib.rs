//! # wmoc-store: Expiring Key-Value Store for the Miner Sync Relay
//!
//! This crate provides the storage layer the relay keeps its per-device
//! message logs and command queues in.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Relay Data Flow                                  │
//! │                                                                         │
//! │  DeviceMessageLog::append / DeviceCommandQueue::pop_next               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    wmoc-store (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ SequenceStore │    │   KeyLocks    │    │ StoreConfig  │  │   │
//! │  │   │ (sequence.rs) │    │  (locks.rs)   │    │ (backend.rs) │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ read / append │───►│ one async     │    │ memory|redis │  │   │
//! │  │   │ pop_front     │    │ mutex per key │    │ open_store() │  │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │                                                     │   │
//! │  │           ▼  dyn ExpiringStore (put / get / forget + TTL)       │   │
//! │  │   ┌───────────────┐    ┌───────────────┐                       │   │
//! │  │   │  MemoryStore  │    │  RedisStore   │                       │   │
//! │  │   └───────────────┘    └───────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`traits`] - The `ExpiringStore` contract
//! - [`memory`] - In-process backend
//! - [`redis_store`] - Redis backend
//! - [`locks`] - Per-key async mutex table
//! - [`sequence`] - JSON sequences with serialized read-modify-write
//! - [`backend`] - Backend selection and connection
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use wmoc_store::{open_store, SequenceStore, StoreConfig};
//!
//! let store = open_store(&StoreConfig::memory()).await?;
//! let sequences = SequenceStore::new(store, Duration::from_secs(24 * 3600));
//!
//! sequences.append("miner_messages_rig-7", entry).await?;
//! let entries: Vec<LogEntry> = sequences.read("miner_messages_rig-7").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod error;
pub mod locks;
pub mod memory;
pub mod redis_store;
pub mod sequence;
pub mod traits;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::{open_store, StoreBackend, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use locks::{KeyGuard, KeyLocks};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use sequence::SequenceStore;
pub use traits::ExpiringStore;
