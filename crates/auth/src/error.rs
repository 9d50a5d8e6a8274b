//! Sign-in and verification errors.
//!
//! Messages are operator-facing: the sign-in view renders [`AuthError`]
//! display text directly, so the wording distinguishes "the store broke"
//! from "the password is wrong" instead of conflating the two.

use pressroom_store::StoreError;

/// Errors surfaced by [`AuthService::sign_in`](crate::service::AuthService::sign_in).
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The email matched neither a superuser nor an administrator row.
    #[error("user not found")]
    UserNotFound,

    /// A row exists for the email but the password did not verify.
    #[error("incorrect password")]
    IncorrectPassword,

    /// The record store failed for a reason other than "no rows".
    #[error("database error")]
    Database(#[from] StoreError),
}

pub type AuthResult<T> = Result<T, AuthError>;
