//! Session gate for protected back-office views.
//!
//! A mounted gate starts in [`GateState::Checking`], runs the configured
//! [`VerifyStrategy`] once, and settles on `Authenticated` or
//! `Unauthenticated`. It then keeps watching the session slot: a write or
//! clear from any context (another tab signing in or out) re-runs the
//! check and pushes the new state to every subscriber.

use pressroom_core::Session;
use tokio::sync::{broadcast, watch};

use crate::service::{AuthService, VerifyStrategy};

/// Route of the sign-in view.
pub const SIGN_IN_PATH: &str = "/admin/login";

/// What a protected view should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// Verification in flight; render nothing yet.
    Checking,
    /// A valid session exists; render the protected view.
    Authenticated(Session),
    /// No valid session; redirect to sign-in.
    Unauthenticated,
}

/// Where to send an unauthenticated visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// The sign-in route.
    pub to: &'static str,
    /// Originally requested path, for the post-login return trip.
    pub from: String,
}

/// Guards one protected view.
pub struct SessionGate {
    state_rx: watch::Receiver<GateState>,
    requested_path: String,
}

impl SessionGate {
    /// Mount the gate for a protected view at `requested_path`.
    ///
    /// Spawns the verification task; it exits when the gate and all
    /// [`changes`](Self::changes) receivers are dropped.
    pub fn mount(
        service: AuthService,
        strategy: VerifyStrategy,
        requested_path: impl Into<String>,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(GateState::Checking);
        let mut notifications = service.slot_changes();

        tokio::spawn(async move {
            // Initial check on mount.
            send_state(&state_tx, service.current_user(strategy).await);

            loop {
                tokio::select! {
                    changed = notifications.recv() => {
                        if matches!(changed, Err(broadcast::error::RecvError::Closed)) {
                            break;
                        }
                        // A lagged receiver still means the slot changed.
                        send_state(&state_tx, service.current_user(strategy).await);
                    }
                    () = state_tx.closed() => break,
                }
            }
        });

        Self {
            state_rx,
            requested_path: requested_path.into(),
        }
    }

    /// Current state without waiting.
    pub fn state(&self) -> GateState {
        self.state_rx.borrow().clone()
    }

    /// Wait for the mount-time check to settle.
    pub async fn resolved(&self) -> GateState {
        let mut rx = self.state_rx.clone();
        loop {
            let state = rx.borrow_and_update().clone();
            if !matches!(state, GateState::Checking) {
                return state;
            }
            if rx.changed().await.is_err() {
                return state;
            }
        }
    }

    /// State updates for reactive consumers.
    pub fn changes(&self) -> watch::Receiver<GateState> {
        self.state_rx.clone()
    }

    /// Redirect for an unauthenticated visitor, carrying the requested
    /// path so sign-in can send them back.
    pub fn redirect(&self) -> Redirect {
        Redirect {
            to: SIGN_IN_PATH,
            from: self.requested_path.clone(),
        }
    }
}

fn send_state(state_tx: &watch::Sender<GateState>, session: Option<Session>) {
    let state = match session {
        Some(session) => GateState::Authenticated(session),
        None => GateState::Unauthenticated,
    };
    // All receivers gone just means nobody is rendering this view.
    let _ = state_tx.send(state);
}
