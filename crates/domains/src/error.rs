//! # DomainError
//!
//! What can go wrong between an actor and the social graph: an unknown
//! identity, a missing post or user, content that fails validation, a
//! post owned by someone else, or a store that cannot be reached.
//! Adapters decide how each variant is shown to the caller.

use thiserror::Error;

/// Returned by every port and service call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// No actor context (missing, invalid or expired identity token)
    #[error("not authenticated")]
    NotAuthenticated,

    /// Resource not found (e.g., User, Post, Task)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., empty content, self-follow)
    #[error("validation error: {0}")]
    Validation(String),

    /// The actor may not touch this resource (e.g., deleting another user's post)
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource already exists (e.g., duplicate username)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., DB down, pool exhausted)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        DomainError::NotFound(entity.to_string(), id.to_string())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }
}

/// `Result` with `DomainError` as the error.
pub type Result<T> = std::result::Result<T, DomainError>;
