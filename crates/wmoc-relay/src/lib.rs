//! # wmoc-relay: Miner Sync Relay
//!
//! Buffers telemetry from remote mining-rig agents and hands each agent the
//! commands an operator queued for it, one per poll.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         WMOC Miner Sync Relay                           │
//! │                                                                         │
//! │   Agent (rig-7)                              Operator dashboard         │
//! │        │                                            │                   │
//! │        │ POST /sync {"hashrate":95}                 │ send / read /     │
//! │        ▼                                            ▼ clear             │
//! │  ┌──────────────┐                          ┌─────────────────┐          │
//! │  │ SyncEndpoint │                          │   OperatorApi   │          │
//! │  └──────┬───────┘                          └────────┬────────┘          │
//! │         │ log report, pop one, log delivery         │                   │
//! │         ▼                                           ▼                   │
//! │  ┌──────────────────┐   logs queued   ┌──────────────────────┐          │
//! │  │ DeviceMessageLog │◄────────────────│ DeviceCommandQueue   │          │
//! │  │ miner_messages_* │                 │ miner_commands_*     │          │
//! │  └────────┬─────────┘                 └──────────┬───────────┘          │
//! │           └──────────────┬───────────────────────┘                      │
//! │                          ▼                                              │
//! │             wmoc-store (memory | redis, sliding TTL)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Delivery Contract
//!
//! - Commands leave a device's queue in the order they were queued.
//! - A command is removed before it is returned, so it is delivered at most
//!   once. A lost response loses the command.
//! - Every report, queued command, and delivery is appended to the device's
//!   log in the order it happened.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wmoc_relay::{Relay, RelayConfig, RelayServer};
//!
//! let config = RelayConfig::load(None)?;
//! let relay = Arc::new(Relay::from_config(&config).await?);
//! let handle = RelayServer::new(config.server.clone(), relay).start().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod command_queue;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod keys;
pub mod message_log;
pub mod relay;
pub mod server;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use command_queue::DeviceCommandQueue;
pub use config::{RelayConfig, RetentionSettings, ServerSettings};
pub use endpoint::SyncEndpoint;
pub use error::{RelayError, RelayResult};
pub use message_log::DeviceMessageLog;
pub use relay::Relay;
pub use server::{relay_router, router, ApiError, RelayHandle, RelayServer};
pub use service::OperatorApi;
