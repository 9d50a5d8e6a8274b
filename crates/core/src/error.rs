//! Domain-level error type shared across the workspace.

use thiserror::Error;

/// Errors produced by core domain logic.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The requested entity does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Input failed domain validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias for fallible core operations.
pub type CoreResult<T> = Result<T, CoreError>;
