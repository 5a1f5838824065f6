//! # wmoc-core: Pure Domain Types for the Miner Sync Relay
//!
//! This crate holds every type that crosses a boundary in the relay: the
//! device identifier, the message-log entry, the queued command and the JSON
//! payloads exchanged with agents and the operator dashboard. It has zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        WMOC Relay Architecture                          │
//! │                                                                         │
//! │  ┌──────────────────────┐           ┌──────────────────────────────┐   │
//! │  │  Mining rig agent    │           │  Operator dashboard          │   │
//! │  │  POST /sync (poll)   │           │  send / read / clear         │   │
//! │  └──────────┬───────────┘           └──────────────┬───────────────┘   │
//! │             │                                      │                    │
//! │  ┌──────────▼──────────────────────────────────────▼───────────────┐   │
//! │  │                    wmoc-relay (HTTP + protocol)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ wmoc-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  device   │  │   types   │  │ protocol  │  │ validation│  │   │
//! │  │   │ DeviceId  │  │ LogEntry  │  │ SyncResp. │  │  command  │  │   │
//! │  │   │ sentinel  │  │ Command   │  │ requests  │  │  fields   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORE • NO NETWORK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`device`] - `DeviceId` and the `"unknown_miner"` sentinel
//! - [`types`] - `LogEntry`, `LogEntryKind`, `Command`, `CommandDetails`
//! - [`protocol`] - JSON bodies for the sync and operator routes
//! - [`validation`] - Operator request validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use wmoc_core::{Command, CommandDetails, DeviceId, UNKNOWN_MINER};
//!
//! assert_eq!(DeviceId::normalize(Some("")).as_str(), UNKNOWN_MINER);
//!
//! let details = CommandDetails::new("execute_api", "get.miner.status");
//! let command = Command::from_details(details);
//! assert_eq!(command.target_command_name, "get.miner.status");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod device;
pub mod error;
pub mod protocol;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use device::{DeviceId, UNKNOWN_MINER};
pub use error::{CoreError, CoreResult, ValidationError};
pub use protocol::{
    ClearResponse, ErrorResponse, MinerQuery, SendCommandRequest, SendCommandResponse,
    SyncResponse,
};
pub use types::{Command, CommandDetails, LogEntry, LogEntryKind};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default retention window for message logs and command queues.
///
/// Every write to a device's log or queue pushes its expiry out to this many
/// hours from the write.
pub const DEFAULT_RETENTION_HOURS: u64 = 24;
