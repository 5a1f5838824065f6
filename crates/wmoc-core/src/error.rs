//! # Error Types
//!
//! Domain-specific error types for wmoc-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  wmoc-core errors (this file)                                          │
//! │  ├── CoreError        - Malformed inbound payloads                     │
//! │  └── ValidationError  - Operator request validation failures           │
//! │                                                                         │
//! │  wmoc-store errors (separate crate)                                    │
//! │  └── StoreError       - Backing cache failures                         │
//! │                                                                         │
//! │  wmoc-relay errors                                                     │
//! │  ├── RelayError       - StorageUnavailable / InvalidRequest            │
//! │  └── ApiError         - What HTTP callers see (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → RelayError → ApiError → caller    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised while interpreting inbound data.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An inbound report body is not valid JSON.
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Operator request validation errors.
///
/// The relay core itself never validates command details; these errors are
/// raised by the operator-facing HTTP layer before anything is enqueued.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// `command_type` or `target_api_command_cmd` missing from a send request.
    ///
    /// The message matches what the dashboard displays verbatim.
    #[error("Command type and target API command are required.")]
    CommandFieldsRequired { missing: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "command_type".to_string(),
        };
        assert_eq!(err.to_string(), "command_type is required");

        let err = ValidationError::CommandFieldsRequired {
            missing: vec!["target_api_command_cmd".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Command type and target API command are required."
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::Required {
            field: "miner_id".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
