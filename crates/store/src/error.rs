//! Store error types and classification.

use thiserror::Error;

/// Errors surfaced by a record store binding.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Structured error reported by the store service.
    #[error("store error {code}: {message}")]
    Service { code: String, message: String },

    /// The HTTP request itself failed (network, DNS, TLS).
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not parse as the expected shape.
    #[error("store response did not parse: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Broad classification of service errors, used by callers to pick
/// operator-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// Row-level security rejected the call.
    PermissionDenied,
    /// A unique constraint was violated.
    UniqueViolation,
    /// A required column was missing.
    NotNullViolation,
    /// Anything else, including transport and decode failures.
    Other,
}

impl StoreError {
    /// Classify this error by the service's reported code and message.
    ///
    /// The codes are the store service's SQLSTATE values: `42501` for a
    /// policy rejection (also recognised by a `policy` mention in the
    /// message), `23505` for a unique violation, `23502` for a not-null
    /// violation.
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::Service { code, message } => match code.as_str() {
                "42501" => StoreErrorKind::PermissionDenied,
                "23505" => StoreErrorKind::UniqueViolation,
                "23502" => StoreErrorKind::NotNullViolation,
                _ if message.contains("policy") => StoreErrorKind::PermissionDenied,
                _ => StoreErrorKind::Other,
            },
            _ => StoreErrorKind::Other,
        }
    }

    /// Shorthand for building a service error in tests and bindings.
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Service {
            code: code.into(),
            message: message.into(),
        }
    }
}
