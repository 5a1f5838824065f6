//! # Device Identity
//!
//! Every piece of relay state is partitioned by the identifier a mining-rig
//! agent reports as `wmoc_assigned_id`.
//!
//! ## Sentinel Normalization
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    DeviceId::normalize(raw)                             │
//! │                                                                         │
//! │  None            ──┐                                                   │
//! │  Some("")        ──┼──► "unknown_miner"                                │
//! │  Some("   ")     ──┘                                                   │
//! │                                                                         │
//! │  Some(" rig-7 ") ─────► "rig-7"        (surrounding whitespace dropped) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Normalization is a pure function applied at every entry point; the sentinel
//! is never stored as process state.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Fallback identifier for reports and commands that carry no device id.
pub const UNKNOWN_MINER: &str = "unknown_miner";

/// Identifier of a remote mining-rig agent.
///
/// Always non-empty: construction goes through [`DeviceId::normalize`], which
/// maps absent or blank input to [`UNKNOWN_MINER`]. Deserializing from JSON or
/// a query string applies the same rule, and `#[serde(default)]` fields fall
/// back to the sentinel through the `Default` impl.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(String);

impl DeviceId {
    /// Normalizes an optional raw identifier.
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(id) if !id.is_empty() => DeviceId(id.to_string()),
            _ => DeviceId::unknown(),
        }
    }

    /// The sentinel device.
    pub fn unknown() -> Self {
        DeviceId(UNKNOWN_MINER.to_string())
    }

    /// Returns true if this is the sentinel device.
    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_MINER
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DeviceId {
    fn default() -> Self {
        DeviceId::unknown()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(raw: &str) -> Self {
        DeviceId::normalize(Some(raw))
    }
}

impl From<String> for DeviceId {
    fn from(raw: String) -> Self {
        DeviceId::normalize(Some(raw.as_str()))
    }
}

impl AsRef<str> for DeviceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for DeviceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DeviceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(DeviceId::normalize(raw.as_deref()))
    }
}
