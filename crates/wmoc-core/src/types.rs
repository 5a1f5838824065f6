//! # Domain Types
//!
//! Types stored by the relay and shown on the operator dashboard.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────────┐        ┌──────────────────────────────┐   │
//! │  │        LogEntry         │        │           Command            │   │
//! │  │  ─────────────────────  │        │  ──────────────────────────  │   │
//! │  │  timestamp (RFC3339)    │        │  wmoc_command_id (UUID)      │   │
//! │  │  type (LogEntryKind)    │        │  command_type                │   │
//! │  │  payload (JSON)         │        │  target_api_command_cmd      │   │
//! │  └─────────────────────────┘        │  target_api_command_param_json│  │
//! │                                     │  ...extension fields         │   │
//! │  ┌─────────────────────────┐        └──────────────────────────────┘   │
//! │  │      LogEntryKind       │                                           │
//! │  │  received_from_miner    │        ┌──────────────────────────────┐   │
//! │  │  sent_to_miner          │        │       CommandDetails         │   │
//! │  │  command_queued_by_server│       │  Command minus the id,       │   │
//! │  └─────────────────────────┘        │  as issued by the operator   │   │
//! │                                     └──────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Names
//! Field and variant names on the wire are the ones the dashboard and the
//! agents already speak (`wmoc_command_id`, `target_api_command_cmd`,
//! `sent_to_miner`, ...). Rust-side names describe what the value is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;
use uuid::Uuid;

/// Wire names owned by [`Command`]; extension fields may not shadow them.
pub const RESERVED_COMMAND_FIELDS: [&str; 4] = [
    "wmoc_command_id",
    "command_type",
    "target_api_command_cmd",
    "target_api_command_param_json",
];

// =============================================================================
// Log Entry Kind
// =============================================================================

/// What a message-log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum LogEntryKind {
    /// A status report arrived from the agent.
    #[serde(rename = "received_from_miner")]
    ReceivedFromDevice,

    /// A queued command was handed to the agent in a sync response.
    #[serde(rename = "sent_to_miner")]
    SentToDevice,

    /// The operator queued a command for the agent.
    #[serde(rename = "command_queued_by_server")]
    CommandQueuedByOperator,
}

impl LogEntryKind {
    /// Returns the wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogEntryKind::ReceivedFromDevice => "received_from_miner",
            LogEntryKind::SentToDevice => "sent_to_miner",
            LogEntryKind::CommandQueuedByOperator => "command_queued_by_server",
        }
    }
}

impl std::fmt::Display for LogEntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Log Entry
// =============================================================================

/// One immutable event in a device's message log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LogEntry {
    /// When the relay recorded the event (UTC).
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,

    /// What happened.
    #[serde(rename = "type")]
    pub kind: LogEntryKind,

    /// The report body or the command involved.
    pub payload: Value,
}

impl LogEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(kind: LogEntryKind, payload: Value) -> Self {
        LogEntry::at(kind, payload, Utc::now())
    }

    /// Creates an entry with an explicit timestamp.
    pub fn at(kind: LogEntryKind, payload: Value, timestamp: DateTime<Utc>) -> Self {
        LogEntry {
            timestamp,
            kind,
            payload,
        }
    }

    /// Entry for an inbound agent report.
    pub fn received(payload: Value) -> Self {
        LogEntry::new(LogEntryKind::ReceivedFromDevice, payload)
    }

    /// Entry for a command delivered in a sync response.
    pub fn sent(command: &Command) -> Self {
        LogEntry::new(LogEntryKind::SentToDevice, command.to_json())
    }

    /// Entry for a command queued by the operator.
    pub fn queued(command: &Command) -> Self {
        LogEntry::new(LogEntryKind::CommandQueuedByOperator, command.to_json())
    }

    /// Returns the command id carried in the payload, if any.
    pub fn command_id(&self) -> Option<Uuid> {
        self.payload
            .get("wmoc_command_id")
            .and_then(Value::as_str)
            .and_then(|id| Uuid::parse_str(id).ok())
    }
}

// =============================================================================
// Command Details
// =============================================================================

/// A command as issued by the operator, before the relay assigns an id.
///
/// The core performs no validation on these fields; the operator-facing layer
/// rejects requests with a missing `command_type` or `target_api_command_cmd`
/// before they reach the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CommandDetails {
    /// Command category understood by the agent (e.g. `execute_api`).
    pub command_type: String,

    /// Name of the API call the agent should run.
    #[serde(rename = "target_api_command_cmd")]
    pub target_command_name: String,

    /// Parameters for the API call. Absent or null becomes `{}`.
    #[serde(rename = "target_api_command_param_json")]
    #[serde(default = "empty_object", deserialize_with = "null_as_empty_object")]
    pub target_params: Value,

    /// Any additional fields, passed through to the agent untouched.
    #[serde(flatten)]
    #[ts(skip)]
    pub extensions: Map<String, Value>,
}

impl CommandDetails {
    /// Creates details with empty parameters and no extensions.
    pub fn new(command_type: impl Into<String>, target_command_name: impl Into<String>) -> Self {
        CommandDetails {
            command_type: command_type.into(),
            target_command_name: target_command_name.into(),
            target_params: empty_object(),
            extensions: Map::new(),
        }
    }

    /// Sets the API call parameters. Null becomes `{}`.
    pub fn with_params(mut self, params: Value) -> Self {
        self.target_params = if params.is_null() {
            empty_object()
        } else {
            params
        };
        self
    }

    /// Adds an extension field.
    pub fn with_extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }
}

// =============================================================================
// Command
// =============================================================================

/// A command waiting in, or popped from, a device's queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Command {
    /// Relay-assigned identifier.
    #[serde(rename = "wmoc_command_id")]
    pub id: Uuid,

    /// Command category understood by the agent.
    pub command_type: String,

    /// Name of the API call the agent should run.
    #[serde(rename = "target_api_command_cmd")]
    pub target_command_name: String,

    /// Parameters for the API call.
    #[serde(rename = "target_api_command_param_json")]
    #[serde(default = "empty_object", deserialize_with = "null_as_empty_object")]
    pub target_params: Value,

    /// Operator-supplied extension fields.
    #[serde(flatten)]
    #[ts(skip)]
    pub extensions: Map<String, Value>,
}

impl Command {
    /// Builds a command with a freshly generated UUID.
    pub fn from_details(details: CommandDetails) -> Self {
        Command::with_id(Uuid::new_v4(), details)
    }

    /// Builds a command with the given id.
    ///
    /// Extension fields that reuse a reserved wire name are dropped, so the
    /// generated id can never be overridden by operator input.
    pub fn with_id(id: Uuid, details: CommandDetails) -> Self {
        let mut extensions = details.extensions;
        for reserved in RESERVED_COMMAND_FIELDS {
            extensions.remove(reserved);
        }

        Command {
            id,
            command_type: details.command_type,
            target_command_name: details.target_command_name,
            target_params: details.target_params,
            extensions,
        }
    }

    /// Returns the JSON object sent to agents and recorded in the log.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert(
            "wmoc_command_id".to_string(),
            Value::String(self.id.to_string()),
        );
        object.insert(
            "command_type".to_string(),
            Value::String(self.command_type.clone()),
        );
        object.insert(
            "target_api_command_cmd".to_string(),
            Value::String(self.target_command_name.clone()),
        );
        object.insert(
            "target_api_command_param_json".to_string(),
            self.target_params.clone(),
        );
        for (key, value) in &self.extensions {
            object.entry(key.clone()).or_insert_with(|| value.clone());
        }
        Value::Object(object)
    }
}

// =============================================================================
// Serde Helpers
// =============================================================================

fn empty_object() -> Value {
    Value::Object(Map::new())
}

fn null_as_empty_object<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(if value.is_null() { empty_object() } else { value })
}

// =============================================================================
// Unit Tests
// =============================================================================
