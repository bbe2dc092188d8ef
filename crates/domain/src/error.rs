//! Unified error types for the domain layer
//!
//! Provides a common error type that can be used across all domain operations,
//! enabling consistent error handling without forcing adapters to use String or anyhow.

use thiserror::Error;

use crate::value_objects::DiceExpressionError;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (an assembly invariant was violated)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Registration collided with an existing catalog entry
    #[error("Duplicate id: {entity_type} {id} already exists")]
    DuplicateId {
        entity_type: &'static str,
        id: String,
    },

    /// Imported payload is malformed or missing required fields
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// Use this when domain invariants or constraints are violated:
    /// - An installation would exceed the shell's slot budget
    /// - A layer is forbidden for the selected shell
    /// - A card does not belong to the layer it targets
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create a duplicate id error
    pub fn duplicate_id(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::DuplicateId {
            entity_type,
            id: id.into(),
        }
    }

    /// Create an invalid data error for malformed import payloads
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

impl From<DiceExpressionError> for DomainError {
    fn from(err: DiceExpressionError) -> Self {
        Self::Parse(err.to_string())
    }
}
