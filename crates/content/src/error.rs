//! Errors from back-office content operations.

use pressroom_core::CoreError;
use pressroom_store::{StoreError, StoreErrorKind};

/// Failure of a content operation, either before the store was called
/// (validation) or reported by it.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ContentResult<T> = Result<T, ContentError>;

impl ContentError {
    /// Message for the admin views. Permission and constraint failures
    /// get a human-readable explanation; anything else passes the raw
    /// store message through.
    pub fn user_message(&self) -> String {
        match self {
            Self::Core(err) => err.to_string(),
            Self::Store(err) => {
                let raw = match err {
                    StoreError::Service { message, .. } => message.clone(),
                    other => other.to_string(),
                };
                match err.kind() {
                    StoreErrorKind::UniqueViolation => {
                        "A post with this title already exists. Please choose a different title."
                            .to_string()
                    }
                    StoreErrorKind::PermissionDenied => {
                        "You do not have the rights for this action. Check that you are signed \
                         in with a superuser account."
                            .to_string()
                    }
                    StoreErrorKind::NotNullViolation => {
                        format!("A required value is missing: {raw}")
                    }
                    StoreErrorKind::Other => raw,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_error(code: &str, message: &str) -> ContentError {
        ContentError::Store(StoreError::service(code, message))
    }

    #[test]
    fn unique_violation_reads_as_duplicate_title() {
        let msg = store_error("23505", "duplicate key value violates unique constraint").user_message();
        assert!(msg.contains("already exists"), "got: {msg}");
    }

    #[test]
    fn permission_denied_mentions_the_superuser_account() {
        let by_code = store_error("42501", "permission denied for table posts").user_message();
        let by_message = store_error("", "new row violates row-level security policy").user_message();
        assert!(by_code.contains("superuser account"), "got: {by_code}");
        assert!(by_message.contains("superuser account"), "got: {by_message}");
    }

    #[test]
    fn not_null_violation_carries_the_store_detail() {
        let msg = store_error("23502", "null value in column \"author\"").user_message();
        assert_eq!(msg, "A required value is missing: null value in column \"author\"");
    }

    #[test]
    fn other_store_errors_pass_the_raw_message_through() {
        let msg = store_error("57014", "canceling statement due to statement timeout").user_message();
        assert_eq!(msg, "canceling statement due to statement timeout");
    }

    #[test]
    fn validation_errors_render_their_own_message() {
        let err = ContentError::Core(CoreError::Validation("title is required".to_string()));
        assert_eq!(err.user_message(), "Validation error: title is required");
    }
}
