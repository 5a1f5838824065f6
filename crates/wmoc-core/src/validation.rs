//! # Validation Module
//!
//! Operator request validation for the relay.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Dashboard (TypeScript)                                       │
//! │  └── Disables "send" until a miner id is entered                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Operator HTTP route (Rust)                                   │
//! │  ├── JSON deserialization                                              │
//! │  └── THIS MODULE: required command fields                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Relay core                                                   │
//! │  └── No validation: accepts whatever details it is handed              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Requires a non-blank string field and returns it as given.
///
/// Blankness is judged on the trimmed value; the returned string keeps any
/// surrounding whitespace the operator sent.
///
/// ## Example
/// ```rust
/// use wmoc_core::validation::require_field;
///
/// assert_eq!(require_field("command_type", Some(" execute_api ")).unwrap(), " execute_api ");
/// assert!(require_field("command_type", Some("")).is_err());
/// assert!(require_field("command_type", None).is_err());
/// ```
pub fn require_field(field: &str, value: Option<&str>) -> ValidationResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        _ => Err(ValidationError::Required {
            field: field.to_string(),
        }),
    }
}

/// Validates the two fields every queued command needs.
///
/// Returns `(command_type, target_api_command_cmd)` unchanged. If either is
/// missing or blank the error lists every missing field.
pub fn validate_command_fields(
    command_type: Option<&str>,
    target_command_name: Option<&str>,
) -> ValidationResult<(String, String)> {
    let command_type = require_field("command_type", command_type);
    let target_command_name = require_field("target_api_command_cmd", target_command_name);

    match (command_type, target_command_name) {
        (Ok(ty), Ok(target)) => Ok((ty, target)),
        (ty, target) => {
            let missing = [ty.err(), target.err()]
                .into_iter()
                .flatten()
                .filter_map(|err| match err {
                    ValidationError::Required { field } => Some(field),
                    _ => None,
                })
                .collect();
            Err(ValidationError::CommandFieldsRequired { missing })
        }
    }
}
