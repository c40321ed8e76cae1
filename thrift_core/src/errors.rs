//! # Error Types
//!
//! Structured error types for thrift_core. Bad measurement text is not an
//! error (the parser returns `None` for in-progress input); these variants
//! cover storage, lookups and malformed payloads.
//!
//! ## Example
//!
//! ```rust
//! use thrift_core::errors::{ThriftError, ThriftResult};
//!
//! fn validate_quantity(quantity: u32) -> ThriftResult<()> {
//!     if quantity == 0 {
//!         return Err(ThriftError::invalid_input(
//!             "quantity",
//!             quantity.to_string(),
//!             "Quantity must be at least 1",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for thrift_core operations
pub type ThriftResult<T> = Result<T, ThriftError>;

/// Structured error type for store and catalog operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum ThriftError {
    /// An input value is invalid (out of range, wrong shape, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// No project with the given id or name
    #[error("Project not found: {project}")]
    ProjectNotFound { project: String },

    /// No abstract material with the given id or name in the catalog
    #[error("Material not found: {material}")]
    MaterialNotFound { material: String },

    /// Durable storage could not be read or written
    #[error("Storage error: {operation} on '{key}' - {reason}")]
    StorageError {
        operation: String,
        key: String,
        reason: String,
    },

    /// Another process holds the storage lock
    #[error("Storage locked: '{key}' is in use by another process")]
    StorageLocked { key: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ThriftError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        ThriftError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a ProjectNotFound error
    pub fn project_not_found(project: impl Into<String>) -> Self {
        ThriftError::ProjectNotFound {
            project: project.into(),
        }
    }

    /// Create a MaterialNotFound error
    pub fn material_not_found(material: impl Into<String>) -> Self {
        ThriftError::MaterialNotFound {
            material: material.into(),
        }
    }

    /// Create a StorageError
    pub fn storage(operation: impl Into<String>, key: impl Into<String>, reason: impl Into<String>) -> Self {
        ThriftError::StorageError {
            operation: operation.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a Serialization error from anything displayable
    pub fn serialization(reason: impl std::fmt::Display) -> Self {
        ThriftError::Serialization {
            reason: reason.to_string(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ThriftError::StorageLocked { .. } | ThriftError::StorageError { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ThriftError::InvalidInput { .. } => "INVALID_INPUT",
            ThriftError::ProjectNotFound { .. } => "PROJECT_NOT_FOUND",
            ThriftError::MaterialNotFound { .. } => "MATERIAL_NOT_FOUND",
            ThriftError::StorageError { .. } => "STORAGE_ERROR",
            ThriftError::StorageLocked { .. } => "STORAGE_LOCKED",
            ThriftError::Serialization { .. } => "SERIALIZATION_ERROR",
            ThriftError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for ThriftError {
    fn from(e: serde_json::Error) -> Self {
        ThriftError::serialization(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = ThriftError::invalid_input("quantity", "0", "Quantity must be at least 1");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: ThriftError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ThriftError::project_not_found("x").error_code(), "PROJECT_NOT_FOUND");
        assert_eq!(ThriftError::material_not_found("MDF").error_code(), "MATERIAL_NOT_FOUND");
        assert_eq!(ThriftError::serialization("bad").error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_recoverable() {
        assert!(ThriftError::StorageLocked { key: "thrift-v1".into() }.is_recoverable());
        assert!(!ThriftError::serialization("bad").is_recoverable());
    }
}
