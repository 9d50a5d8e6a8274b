//! Signed-in operator identity.

use serde::{Deserialize, Serialize};

use crate::roles::Role;
use crate::types::RecordId;

/// Identity of a signed-in operator.
///
/// Serializes to exactly the `{id, email, name, role}` payload persisted in
/// the session slot. Services that need an actor (activity logging) take it
/// by reference instead of re-reading the slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: RecordId,
    pub email: String,
    pub name: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_slot_payload() {
        let payload = r#"{"id":"42","email":"ops@example.com","name":"Ops","role":"superuser"}"#;
        let session: Session = serde_json::from_str(payload).unwrap();
        assert_eq!(session.id, "42");
        assert_eq!(session.role, Role::Superuser);
        assert_eq!(serde_json::to_string(&session).unwrap(), payload);
    }

    #[test]
    fn payload_missing_field_rejected() {
        let payload = r#"{"id":"42","email":"ops@example.com"}"#;
        assert!(serde_json::from_str::<Session>(payload).is_err());
    }
}
