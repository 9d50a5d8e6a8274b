//! Operator authentication for the back office.
//!
//! - [`password`] -- password verification chain and hash generation.
//! - [`slot`] -- process-wide session slot with change notification.
//! - [`backend`] -- backend auth subsystem port and its REST binding.
//! - [`service`] -- sign-in, sign-out, and session verification flows.
//! - [`gate`] -- session gate state machine for protected views.

pub mod backend;
pub mod error;
pub mod gate;
pub mod password;
pub mod service;
pub mod slot;

pub use backend::{AuthBackend, BackendAuthError, BackendUser, RestAuthBackend, StubAuthBackend};
pub use error::{AuthError, AuthResult};
pub use gate::{GateState, Redirect, SessionGate, SIGN_IN_PATH};
pub use service::{AuthConfig, AuthService, VerifyStrategy};
pub use slot::{MemorySessionSlot, SessionSlot, SESSION_SLOT_KEY};
