//! # Store Error Types
//!
//! Error types for store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  Backend error (redis::RedisError, serde_json::Error)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds key context and categorization        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RelayError::StorageUnavailable (in wmoc-relay)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  HTTP 500 { "status": "error", "message": ... }                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Could not reach the backend.
    ///
    /// ## When This Occurs
    /// - Redis refused or dropped the connection
    /// - Initial connection at startup failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The backend rejected or failed a command.
    #[error("Store backend unavailable: {0}")]
    Unavailable(String),

    /// A stored value no longer decodes as the expected sequence.
    #[error("Corrupt value under key {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// A value could not be encoded for storage.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Store configuration is invalid.
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),
}

impl StoreError {
    /// Creates a Corrupt error for a given key.
    pub fn corrupt(key: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::Corrupt {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

/// Convert Redis errors to StoreError.
impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_connection_dropped() {
            StoreError::ConnectionFailed(err.to_string())
        } else {
            StoreError::Unavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_error_mentions_key() {
        let err = StoreError::corrupt("miner_commands_rig-7", "expected array");
        assert!(err.to_string().contains("miner_commands_rig-7"));
        assert!(err.to_string().contains("expected array"));
    }
}
