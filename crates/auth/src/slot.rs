//! Process-wide session slot with change notification.
//!
//! The slot is the client-held storage cell where a signed-in operator's
//! session payload lives, keyed by [`SESSION_SLOT_KEY`] in keyed backends.
//! Writes and clears publish a change notification so gates mounted in
//! other contexts (tabs, windows) can re-run their check reactively.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use pressroom_core::Session;
use tokio::sync::broadcast;

/// Fixed key under which keyed storage backends hold the payload.
pub const SESSION_SLOT_KEY: &str = "pressroom_user";

/// Buffered change notifications per subscriber.
const NOTIFY_CAPACITY: usize = 16;

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// Client-held storage cell for the serialized session payload.
#[async_trait]
pub trait SessionSlot: Send + Sync {
    /// Current payload, if any.
    async fn get(&self) -> Option<String>;

    /// Replace the payload.
    async fn set(&self, payload: String);

    /// Empty the slot.
    async fn clear(&self);

    /// Subscribe to change notifications. A lagged or closed receiver
    /// carries no payload anyway; treat either as "re-check now".
    fn subscribe(&self) -> broadcast::Receiver<()>;
}

// ---------------------------------------------------------------------------
// Payload codec
// ---------------------------------------------------------------------------

/// Serialize a session for slot storage.
pub fn session_to_payload(session: &Session) -> String {
    serde_json::to_string(session).expect("session serializes to JSON")
}

/// Parse a stored payload. Malformed payloads are not sessions.
pub fn payload_to_session(payload: &str) -> Option<Session> {
    serde_json::from_str(payload).ok()
}

// ---------------------------------------------------------------------------
// In-memory slot
// ---------------------------------------------------------------------------

/// In-process slot. Clones share state, standing in for the shared
/// browser storage that backs the slot in the deployed front end.
#[derive(Clone)]
pub struct MemorySessionSlot {
    inner: Arc<SlotInner>,
}

struct SlotInner {
    payload: RwLock<Option<String>>,
    notify: broadcast::Sender<()>,
}

impl MemorySessionSlot {
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(NOTIFY_CAPACITY);
        Self {
            inner: Arc::new(SlotInner {
                payload: RwLock::new(None),
                notify,
            }),
        }
    }

    fn publish(&self) {
        // Nobody subscribed is fine.
        let _ = self.inner.notify.send(());
    }
}

impl Default for MemorySessionSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionSlot for MemorySessionSlot {
    async fn get(&self) -> Option<String> {
        self.inner
            .payload
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn set(&self, payload: String) {
        *self
            .inner
            .payload
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(payload);
        self.publish();
    }

    async fn clear(&self) {
        *self
            .inner
            .payload
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        self.publish();
    }

    fn subscribe(&self) -> broadcast::Receiver<()> {
        self.inner.notify.subscribe()
    }
}
