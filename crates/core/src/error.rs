//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// lookups, conflicts). Persistence and rendering failures belong to the
/// infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input failed validation (missing client, empty designation, split
    /// shares that do not reconcile with the invoice total, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. empty string).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested record was not found.
    #[error("not found")]
    NotFound,

    /// The operation conflicts with the current state (duplicate id, invoice
    /// already split, ...).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Whether this error should be surfaced to the user as a form/input
    /// problem rather than a state problem.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidId(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_distinguished_from_state_errors() {
        assert!(DomainError::validation("missing client").is_validation());
        assert!(DomainError::invalid_id("").is_validation());
        assert!(!DomainError::not_found().is_validation());
        assert!(!DomainError::conflict("already split").is_validation());
        assert_eq!(
            DomainError::conflict("already split").to_string(),
            "conflict: already split"
        );
    }
}
