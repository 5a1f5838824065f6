//! # Relay
//!
//! Wires the log, queue, and sync endpoint over one shared store.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              Relay                                      │
//! │                                                                         │
//! │   Arc<dyn ExpiringStore> ──► SequenceStore (per-key locks, TTL)         │
//! │                                   │                                     │
//! │                   ┌───────────────┼────────────────┐                    │
//! │                   ▼               ▼                ▼                    │
//! │           DeviceMessageLog  DeviceCommandQueue  SyncEndpoint            │
//! │                   ▲               │  (logs)        │ (log + queue)      │
//! │                   └───────────────┘                │                    │
//! │                                                    │                    │
//! │   impl OperatorApi ◄── dashboard routes            └──◄ /sync           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;
use wmoc_core::{CommandDetails, DeviceId, LogEntry, SyncResponse};
use wmoc_store::{open_store, ExpiringStore, SequenceStore};

use crate::command_queue::DeviceCommandQueue;
use crate::config::RelayConfig;
use crate::endpoint::SyncEndpoint;
use crate::error::RelayResult;
use crate::message_log::DeviceMessageLog;
use crate::service::OperatorApi;

/// The assembled relay.
#[derive(Debug, Clone)]
pub struct Relay {
    log: DeviceMessageLog,
    queue: DeviceCommandQueue,
    endpoint: SyncEndpoint,
}

impl Relay {
    /// Builds a relay over `store` with the given retention window.
    pub fn new(store: Arc<dyn ExpiringStore>, ttl: Duration) -> Self {
        let sequences = Arc::new(SequenceStore::new(store, ttl));
        let log = DeviceMessageLog::new(sequences.clone());
        let queue = DeviceCommandQueue::new(sequences, log.clone());
        let endpoint = SyncEndpoint::new(log.clone(), queue.clone());

        Relay {
            log,
            queue,
            endpoint,
        }
    }

    /// Opens the configured store and builds a relay over it.
    pub async fn from_config(config: &RelayConfig) -> RelayResult<Self> {
        let store = open_store(&config.store).await?;
        info!(
            backend = store.backend_name(),
            ttl_hours = config.retention.ttl_hours,
            "Relay store ready"
        );
        Ok(Relay::new(store, config.ttl()))
    }

    pub fn log(&self) -> &DeviceMessageLog {
        &self.log
    }

    pub fn queue(&self) -> &DeviceCommandQueue {
        &self.queue
    }

    pub fn endpoint(&self) -> &SyncEndpoint {
        &self.endpoint
    }

    /// Handles one agent report.
    pub async fn report(&self, device: &DeviceId, payload: Value) -> RelayResult<SyncResponse> {
        self.endpoint.handle_report(device, payload).await
    }
}

#[async_trait]
impl OperatorApi for Relay {
    async fn enqueue_command(&self, device: &DeviceId, details: CommandDetails) -> RelayResult<Uuid> {
        self.queue.enqueue(device, details).await
    }

    async fn read_log(&self, device: &DeviceId) -> RelayResult<Vec<LogEntry>> {
        self.log.read(device).await
    }

    async fn clear_log(&self, device: &DeviceId) -> RelayResult<()> {
        self.log.clear(device).await?;
        info!(device_id = %device, "Message log cleared");
        Ok(())
    }

    async fn clear_commands(&self, device: &DeviceId) -> RelayResult<()> {
        self.queue.clear(device).await?;
        info!(device_id = %device, "Command queue cleared");
        Ok(())
    }
}
