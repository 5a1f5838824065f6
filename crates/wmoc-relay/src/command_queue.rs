//! # Device Command Queue
//!
//! FIFO of commands waiting for a device's next poll.
//!
//! ## Command Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  operator ──enqueue──► [ C1, C2, C3 ]  ──pop_next──► agent (C1 only)    │
//! │                │                                                        │
//! │                └──► log: command_queued_by_server(C)                    │
//! │                                                                         │
//! │  A popped command is gone from the queue before it is handed to the     │
//! │  caller. It is never delivered twice, even if the response is lost.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;
use wmoc_core::{Command, CommandDetails, DeviceId, LogEntry};
use wmoc_store::SequenceStore;

use crate::error::RelayResult;
use crate::keys::commands_key;
use crate::message_log::DeviceMessageLog;

/// Per-device command queue.
#[derive(Debug, Clone)]
pub struct DeviceCommandQueue {
    sequences: Arc<SequenceStore>,
    log: DeviceMessageLog,
}

impl DeviceCommandQueue {
    pub fn new(sequences: Arc<SequenceStore>, log: DeviceMessageLog) -> Self {
        Self { sequences, log }
    }

    /// Assigns an id, queues the command at the tail, and records it in the
    /// device's log. Returns the new command id.
    ///
    /// No validation is applied to `details`.
    pub async fn enqueue(&self, device: &DeviceId, details: CommandDetails) -> RelayResult<Uuid> {
        let command = Command::from_details(details);
        let command_id = command.id;
        let entry = LogEntry::queued(&command);

        let pending = self.sequences.append(&commands_key(device), command).await?;
        self.log.append(device, entry).await?;

        info!(device_id = %device, command_id = %command_id, pending, "Command queued");
        Ok(command_id)
    }

    /// Removes and returns the oldest pending command.
    pub async fn pop_next(&self, device: &DeviceId) -> RelayResult<Option<Command>> {
        let next: Option<Command> = self.sequences.pop_front(&commands_key(device)).await?;
        if let Some(ref command) = next {
            debug!(device_id = %device, command_id = %command.id, "Command popped");
        }
        Ok(next)
    }

    /// Commands still waiting, oldest first.
    pub async fn pending(&self, device: &DeviceId) -> RelayResult<Vec<Command>> {
        Ok(self.sequences.read(&commands_key(device)).await?)
    }

    /// Drops every pending command for the device.
    pub async fn clear(&self, device: &DeviceId) -> RelayResult<()> {
        self.sequences.clear(&commands_key(device)).await?;
        debug!(device_id = %device, "Command queue cleared");
        Ok(())
    }
}
