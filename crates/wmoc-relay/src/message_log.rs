//! # Device Message Log
//!
//! Append-only, time-ordered record of everything that happened for a
//! device: reports received, commands queued, commands delivered.
//!
//! ```text
//! miner_messages_rig-7 = [
//!   { type: command_queued_by_server, payload: {wmoc_command_id: U, ..} },
//!   { type: received_from_miner,      payload: {hashrate: 95} },
//!   { type: sent_to_miner,            payload: {wmoc_command_id: U, ..} },
//! ]
//! ```
//!
//! The whole sequence lives under one key. Every append restarts its
//! retention window; entries never expire individually.

use std::sync::Arc;

use tracing::debug;
use wmoc_core::{DeviceId, LogEntry};
use wmoc_store::SequenceStore;

use crate::error::RelayResult;
use crate::keys::messages_key;

/// Per-device message log.
#[derive(Debug, Clone)]
pub struct DeviceMessageLog {
    sequences: Arc<SequenceStore>,
}

impl DeviceMessageLog {
    pub fn new(sequences: Arc<SequenceStore>) -> Self {
        Self { sequences }
    }

    /// Appends an entry at the tail of the device's log.
    pub async fn append(&self, device: &DeviceId, entry: LogEntry) -> RelayResult<()> {
        let kind = entry.kind;
        let len = self.sequences.append(&messages_key(device), entry).await?;
        debug!(device_id = %device, kind = %kind, len, "Log entry appended");
        Ok(())
    }

    /// Returns every entry, oldest first. Empty if absent or expired.
    pub async fn read(&self, device: &DeviceId) -> RelayResult<Vec<LogEntry>> {
        Ok(self.sequences.read(&messages_key(device)).await?)
    }

    /// Drops the device's log. Clearing an absent log succeeds.
    pub async fn clear(&self, device: &DeviceId) -> RelayResult<()> {
        self.sequences.clear(&messages_key(device)).await?;
        debug!(device_id = %device, "Log cleared");
        Ok(())
    }
}
