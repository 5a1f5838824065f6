//! # Sync Endpoint
//!
//! The poll/report/deliver cycle an agent runs on every check-in.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         handle_report                                   │
//! │                                                                         │
//! │  1. Receive          normalize device id, take the JSON payload        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  2. Record inbound   log ← received_from_miner(payload)                │
//! │        │             (completes before anything is popped)              │
//! │        ▼                                                                │
//! │  3. Drain one        queue.pop_next()                                   │
//! │        │                                                                │
//! │        ├── None ────────────────────────────────┐                       │
//! │        ▼                                        │                       │
//! │  4. Record outbound  log ← sent_to_miner(cmd)   │                       │
//! │        │                                        │                       │
//! │        ▼                                        ▼                       │
//! │  5. Respond   { status, message, server_timestamp_utc, next_command }  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A storage failure at any step aborts the request. Steps already taken
//! stay taken: if the response is lost after step 3, the popped command is
//! not re-queued.

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use wmoc_core::protocol::{parse_report_body, report_device_id};
use wmoc_core::{DeviceId, LogEntry, SyncResponse};

use crate::command_queue::DeviceCommandQueue;
use crate::error::RelayResult;
use crate::message_log::DeviceMessageLog;

/// Handles agent reports.
#[derive(Debug, Clone)]
pub struct SyncEndpoint {
    log: DeviceMessageLog,
    queue: DeviceCommandQueue,
}

impl SyncEndpoint {
    pub fn new(log: DeviceMessageLog, queue: DeviceCommandQueue) -> Self {
        Self { log, queue }
    }

    /// Turns a raw request into a device and payload.
    ///
    /// An empty or undecodable body is `{}`. The device id comes from the
    /// body's `wmoc_assigned_id`, then `query_id`, then the sentinel.
    pub fn receive(&self, body: &[u8], query_id: Option<&str>) -> (DeviceId, Value) {
        let payload = parse_report_body(body).unwrap_or_else(|e| {
            warn!(error = %e, bytes = body.len(), "Undecodable report body, recording as {{}}");
            Value::Object(Map::new())
        });
        let device = report_device_id(&payload, query_id);
        (device, payload)
    }

    /// Runs one report through the cycle and returns the agent's response.
    pub async fn handle_report(&self, device: &DeviceId, payload: Value) -> RelayResult<SyncResponse> {
        debug!(device_id = %device, "Report received");
        self.log.append(device, LogEntry::received(payload)).await?;

        let next_command = self.queue.pop_next(device).await?;

        if let Some(ref command) = next_command {
            self.log.append(device, LogEntry::sent(command)).await?;
            info!(device_id = %device, command_id = %command.id, "Command delivered");
        }

        Ok(SyncResponse::delivered(next_command, Utc::now()))
    }

    /// `receive` followed by `handle_report`.
    pub async fn handle_raw(&self, body: &[u8], query_id: Option<&str>) -> RelayResult<SyncResponse> {
        let (device, payload) = self.receive(body, query_id);
        self.handle_report(&device, payload).await
    }
}
