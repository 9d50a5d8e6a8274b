//! Core domain logic for the pressroom back office.
//!
//! Pure, synchronous building blocks shared by the service crates: operator
//! roles and sessions, the content editing engine (toolbar operations,
//! bounded undo history, cursor restoration) and small helpers such as slug
//! derivation. Nothing in this crate performs I/O.

pub mod editor;
pub mod error;
pub mod roles;
pub mod session;
pub mod slug;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use roles::Role;
pub use session::Session;
