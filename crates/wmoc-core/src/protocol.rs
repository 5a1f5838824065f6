//! # Relay Wire Payloads
//!
//! JSON bodies exchanged with mining-rig agents and the operator dashboard.
//!
//! ## Protocol Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Relay HTTP Payloads                                │
//! │                                                                         │
//! │  AGENT POLL                                                            │
//! │  ──────────                                                            │
//! │  AGENT ───► POST /sync   { wmoc_assigned_id?, ...status report }       │
//! │  RELAY ◄─── SyncResponse { status, message, server_timestamp_utc,      │
//! │                            next_command: Command | null }              │
//! │                                                                         │
//! │  OPERATOR                                                              │
//! │  ────────                                                              │
//! │  DASH  ───► POST /send_miner_command  SendCommandRequest               │
//! │  RELAY ◄─── SendCommandResponse { wmoc_command_id }                    │
//! │  DASH  ───► GET  /miner_log?miner_id=  → [LogEntry]                    │
//! │  DASH  ───► POST /clear_miner_log      → ClearResponse                 │
//! │                                                                         │
//! │  ERROR                                                                 │
//! │  ─────                                                                 │
//! │  RELAY ◄─── ErrorResponse { status: "error", message }                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;
use uuid::Uuid;

use crate::device::DeviceId;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Command, CommandDetails};
use crate::validation::validate_command_fields;

/// Body/query field an agent uses to identify itself.
pub const DEVICE_ID_FIELD: &str = "wmoc_assigned_id";

/// `status` value on every successful response.
pub const STATUS_SUCCESS: &str = "success";

/// `status` value on every error response.
pub const STATUS_ERROR: &str = "error";

/// Acknowledgment text in sync responses.
pub const SYNC_ACK_MESSAGE: &str = "Data received";

/// Acknowledgment text after a command is queued.
pub const COMMAND_QUEUED_MESSAGE: &str = "Command queued";

// =============================================================================
// Agent Sync
// =============================================================================

/// Response to an agent's status report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SyncResponse {
    /// Always `"success"`.
    pub status: String,

    /// Always `"Data received"`.
    pub message: String,

    /// Relay clock at response time (RFC3339, `Z` suffix, same shape as log
    /// entry timestamps).
    pub server_timestamp_utc: String,

    /// The command popped for this agent, or null if its queue was empty.
    pub next_command: Option<Command>,
}

impl SyncResponse {
    /// Builds the acknowledgment for a report handled at `at`.
    pub fn delivered(next_command: Option<Command>, at: DateTime<Utc>) -> Self {
        SyncResponse {
            status: STATUS_SUCCESS.to_string(),
            message: SYNC_ACK_MESSAGE.to_string(),
            server_timestamp_utc: at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            next_command,
        }
    }
}

/// Parses an inbound report body.
///
/// An empty body is treated as an empty object. A body that is not JSON is
/// an error here; the sync endpoint records it as `{}` and carries on.
pub fn parse_report_body(body: &[u8]) -> CoreResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(|e| CoreError::InvalidJson(e.to_string()))
}

/// Resolves the reporting device.
///
/// A `wmoc_assigned_id` in the body takes precedence over the query
/// parameter. Numeric ids are keyed by their decimal text. If neither source
/// is usable the sentinel device is returned.
pub fn report_device_id(body: &Value, query_id: Option<&str>) -> DeviceId {
    let body_id = match body.get(DEVICE_ID_FIELD) {
        Some(Value::String(id)) => Some(id.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
    .filter(|id| !id.trim().is_empty());

    DeviceId::normalize(body_id.as_deref().or(query_id))
}

// =============================================================================
// Operator Requests
// =============================================================================

/// Query/body carrying only a device id (`miner_id`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerQuery {
    #[serde(default)]
    pub miner_id: DeviceId,
}

/// Body of `POST /send_miner_command`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendCommandRequest {
    /// Target device; missing or blank means the sentinel device.
    #[serde(default)]
    pub miner_id: DeviceId,

    #[serde(default)]
    pub command_type: Option<String>,

    #[serde(default)]
    pub target_api_command_cmd: Option<String>,

    #[serde(default)]
    pub target_api_command_param_json: Option<Value>,

    /// Extra fields forwarded to the agent with the command.
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl SendCommandRequest {
    /// Validates the request and splits it into target device and details.
    pub fn into_command(self) -> Result<(DeviceId, CommandDetails), ValidationError> {
        let (command_type, target_command_name) = validate_command_fields(
            self.command_type.as_deref(),
            self.target_api_command_cmd.as_deref(),
        )?;

        let mut details = CommandDetails::new(command_type, target_command_name)
            .with_params(self.target_api_command_param_json.unwrap_or(Value::Null));
        details.extensions = self.extensions;

        Ok((self.miner_id, details))
    }
}

// =============================================================================
// Operator Responses
// =============================================================================

/// Response to a successful `POST /send_miner_command`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SendCommandResponse {
    pub status: String,
    pub message: String,
    pub wmoc_command_id: Uuid,
}

impl SendCommandResponse {
    pub fn queued(command_id: Uuid) -> Self {
        SendCommandResponse {
            status: STATUS_SUCCESS.to_string(),
            message: COMMAND_QUEUED_MESSAGE.to_string(),
            wmoc_command_id: command_id,
        }
    }
}

/// Response to `POST /clear_miner_log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClearResponse {
    pub status: String,
    pub message: String,
}

impl ClearResponse {
    pub fn cleared(device_id: &DeviceId) -> Self {
        ClearResponse {
            status: STATUS_SUCCESS.to_string(),
            message: format!("Data cleared for miner: {}", device_id),
        }
    }
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorResponse {
            status: STATUS_ERROR.to_string(),
            message: message.into(),
        }
    }
}
