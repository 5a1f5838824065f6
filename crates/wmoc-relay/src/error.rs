//! # Relay Error Types
//!
//! Error types for relay operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Relay Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Storage      │  │     Request             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Storage-       │  │  InvalidRequest         │ │
//! │  │  ConfigLoad-    │  │  Unavailable    │  │  (HTTP 400)             │ │
//! │  │  Failed         │  │  (HTTP 500)     │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │   Transport     │                                                   │
//! │  │                 │                                                   │
//! │  │  BindFailed     │                                                   │
//! │  │  ChannelError   │                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use wmoc_core::{CoreError, ValidationError};
use wmoc_store::StoreError;

/// Result type alias for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

/// Relay error type.
#[derive(Debug, Error)]
pub enum RelayError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid relay configuration.
    #[error("Invalid relay configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// The backing store could not be read or written, or holds a value
    /// that no longer decodes.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    // =========================================================================
    // Request Errors
    // =========================================================================
    /// The caller sent something the relay cannot act on.
    #[error("{0}")]
    InvalidRequest(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Could not bind the HTTP listener.
    #[error("Failed to bind {addr}: {reason}")]
    BindFailed { addr: String, reason: String },

    /// Server control channel closed.
    #[error("Channel error: {0}")]
    ChannelError(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<StoreError> for RelayError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidConfig(msg) => RelayError::InvalidConfig(msg),
            other => RelayError::StorageUnavailable(other.to_string()),
        }
    }
}

impl From<CoreError> for RelayError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(inner) => inner.into(),
            other => RelayError::InvalidRequest(other.to_string()),
        }
    }
}

impl From<ValidationError> for RelayError {
    fn from(err: ValidationError) -> Self {
        RelayError::InvalidRequest(err.to_string())
    }
}

impl From<std::io::Error> for RelayError {
    fn from(err: std::io::Error) -> Self {
        RelayError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for RelayError {
    fn from(err: toml::de::Error) -> Self {
        RelayError::ConfigLoadFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl RelayError {
    /// Returns true if the caller is at fault (HTTP 4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(self, RelayError::InvalidRequest(_))
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            RelayError::InvalidConfig(_) | RelayError::ConfigLoadFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_become_storage_unavailable() {
        let err: RelayError = StoreError::ConnectionFailed("refused".into()).into();
        assert!(matches!(err, RelayError::StorageUnavailable(_)));
        assert!(!err.is_client_error());

        let err: RelayError = StoreError::corrupt("miner_messages_x", "eof").into();
        assert!(matches!(err, RelayError::StorageUnavailable(_)));

        let err: RelayError = StoreError::InvalidConfig("bad url".into()).into();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err: RelayError = ValidationError::CommandFieldsRequired {
            missing: vec!["command_type".into()],
        }
        .into();
        assert!(err.is_client_error());
        assert_eq!(
            err.to_string(),
            "Command type and target API command are required."
        );
    }

    #[test]
    fn test_invalid_json_is_client_error() {
        let err: RelayError = CoreError::InvalidJson("expected value".into()).into();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("expected value"));
    }
}
