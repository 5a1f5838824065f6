//! # Operator Service
//!
//! What the dashboard can do to a device. The HTTP layer talks to this trait
//! rather than to the log and queue directly, so alternative backends or
//! test doubles can stand in for [`Relay`](crate::Relay).

use async_trait::async_trait;
use uuid::Uuid;
use wmoc_core::{CommandDetails, DeviceId, LogEntry};

use crate::error::RelayResult;

/// Operator-facing relay operations.
#[async_trait]
pub trait OperatorApi: Send + Sync {
    /// Queues a command for the device's next poll and returns its id.
    async fn enqueue_command(&self, device: &DeviceId, details: CommandDetails) -> RelayResult<Uuid>;

    /// Returns the device's message log, oldest first.
    async fn read_log(&self, device: &DeviceId) -> RelayResult<Vec<LogEntry>>;

    /// Drops the device's message log.
    async fn clear_log(&self, device: &DeviceId) -> RelayResult<()>;

    /// Drops every command still waiting for the device.
    async fn clear_commands(&self, device: &DeviceId) -> RelayResult<()>;

    /// Clears both log and queue, as the dashboard's "clear" button does.
    async fn clear_device(&self, device: &DeviceId) -> RelayResult<()> {
        self.clear_log(device).await?;
        self.clear_commands(device).await
    }
}
