//! Sign-in, sign-out, and session verification flows.
//!
//! Superusers carry a `password_hash` in their own table and sign in
//! entirely against the record store; administrators are verified by the
//! backend auth service and cross-checked against their table row. Both
//! flows meet in [`AuthService`].

use std::sync::Arc;

use pressroom_core::{Role, Session};
use pressroom_store::{tables, Filter, Query, RecordStore, Row, StoreError};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::backend::AuthBackend;
use crate::error::{AuthError, AuthResult};
use crate::password;
use crate::slot::{self, SessionSlot};

/// How [`AuthService::current_user`] decides whether a session is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyStrategy {
    /// Trust a well-formed slot payload without any network re-check.
    LocalOnly,
    /// Re-confirm the subject against the store, or the backend session
    /// for administrators, before trusting it.
    BackendRevalidated,
}

/// Tunables for the sign-in flow.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Email/password pairs reserved for test and emergency access,
    /// consulted only when the stored hash is neither a `$...` hash nor
    /// a marked plaintext value.
    pub password_allow_list: Vec<(String, String)>,
}

/// Operator sign-in and session verification against the injected ports.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn RecordStore>,
    backend: Arc<dyn AuthBackend>,
    slot: Arc<dyn SessionSlot>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        backend: Arc<dyn AuthBackend>,
        slot: Arc<dyn SessionSlot>,
        config: AuthConfig,
    ) -> Self {
        Self {
            store,
            backend,
            slot,
            config,
        }
    }

    /// Change notifications from the session slot.
    pub fn slot_changes(&self) -> broadcast::Receiver<()> {
        self.slot.subscribe()
    }

    // -----------------------------------------------------------------------
    // Sign-in / sign-out
    // -----------------------------------------------------------------------

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        // 1. Superusers sign in against their own table, matched
        //    case-insensitively.
        if let Some(row) = self.superuser_by_email(email).await? {
            let stored = row_str(&row, "password_hash").unwrap_or_default();
            if !password::verify_password(password, stored, email, &self.config.password_allow_list)
            {
                return Err(AuthError::IncorrectPassword);
            }

            // 2. Best-effort last-login stamp; sign-in succeeds regardless.
            self.touch_last_login(tables::SUPERUSERS, &row).await;

            let session = superuser_session(&row);
            self.slot.set(slot::session_to_payload(&session)).await;
            tracing::info!(email = %session.email, role = %session.role, "operator signed in");
            return Ok(session);
        }

        // 3. Not a superuser; the email must map to an administrator row.
        let Some(row) = self.admin_by_email(email).await? else {
            return Err(AuthError::UserNotFound);
        };

        // 4. Administrators are verified by the backend auth service. The
        //    row exists, so a rejection means the password is wrong.
        if let Err(err) = self.backend.sign_in_with_password(email, password).await {
            tracing::warn!(email, error = %err, "backend rejected administrator sign-in");
            return Err(AuthError::IncorrectPassword);
        }

        // 5. Same best-effort stamp for administrators. Their session is
        //    held by the backend, not the slot.
        self.touch_last_login(tables::ADMINISTRATORS, &row).await;

        let session = admin_session(&row);
        tracing::info!(email = %session.email, role = %session.role, "operator signed in");
        Ok(session)
    }

    /// Ends the session. The local clear always happens; with
    /// [`VerifyStrategy::BackendRevalidated`] the backend session is ended
    /// too, and a failure there is logged rather than raised.
    pub async fn sign_out(&self, strategy: VerifyStrategy) {
        self.slot.clear().await;
        if strategy == VerifyStrategy::BackendRevalidated {
            if let Err(err) = self.backend.sign_out().await {
                tracing::warn!(error = %err, "backend sign-out failed");
            }
        }
        tracing::info!("operator signed out");
    }

    // -----------------------------------------------------------------------
    // Verification
    // -----------------------------------------------------------------------

    /// The current session under the given strategy, or `None`.
    pub async fn current_user(&self, strategy: VerifyStrategy) -> Option<Session> {
        match strategy {
            VerifyStrategy::LocalOnly => self.local_session().await,
            VerifyStrategy::BackendRevalidated => self.revalidated_session().await,
        }
    }

    async fn local_session(&self) -> Option<Session> {
        let payload = self.slot.get().await?;
        let session = slot::payload_to_session(&payload)?;
        // Locally issued sessions are superuser-only; anything else in
        // the slot is not vouched for without a backend check.
        (session.role == Role::Superuser).then_some(session)
    }

    async fn revalidated_session(&self) -> Option<Session> {
        // A stored payload is only trusted while its superuser row still
        // exists; a stale payload is dropped from the slot.
        if let Some(payload) = self.slot.get().await {
            let session = slot::payload_to_session(&payload)?;
            match self.superuser_by_email(&session.email).await {
                Ok(Some(row)) => return Some(superuser_session(&row)),
                Ok(None) => self.slot.clear().await,
                Err(err) => {
                    tracing::warn!(error = %err, "superuser revalidation failed");
                    self.slot.clear().await;
                }
            }
        }

        // Administrators ride on the backend-held session, cross-checked
        // against their table row.
        let user = self.backend.session().await?;
        match self.admin_by_email(&user.email).await {
            Ok(Some(row)) => Some(admin_session(&row)),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(error = %err, "administrator revalidation failed");
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Store lookups
    // -----------------------------------------------------------------------

    async fn superuser_by_email(&self, email: &str) -> Result<Option<Row>, StoreError> {
        let rows = self
            .store
            .select(
                tables::SUPERUSERS,
                Query::new()
                    .filter(Filter::new().ilike("email", email))
                    .limit(1),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn admin_by_email(&self, email: &str) -> Result<Option<Row>, StoreError> {
        let rows = self
            .store
            .select(
                tables::ADMINISTRATORS,
                Query::new()
                    .filter(Filter::new().ilike("email", email))
                    .limit(1),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn touch_last_login(&self, table: &'static str, row: &Row) {
        let Some(id) = row.get("id") else { return };
        let mut patch = Row::new();
        patch.insert(
            "last_login".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
        if let Err(err) = self
            .store
            .update(table, patch, Filter::new().eq("id", id.clone()))
            .await
        {
            tracing::warn!(table, error = %err, "last-login update failed");
        }
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn row_str<'a>(row: &'a Row, key: &str) -> Option<&'a str> {
    row.get(key).and_then(Value::as_str)
}

fn superuser_session(row: &Row) -> Session {
    let name = row_str(row, "name").filter(|name| !name.is_empty());
    Session {
        id: row_str(row, "id").unwrap_or_default().to_string(),
        email: row_str(row, "email").unwrap_or_default().to_string(),
        name: name.unwrap_or("Superuser").to_string(),
        role: Role::Superuser,
    }
}

fn admin_session(row: &Row) -> Session {
    Session {
        id: row_str(row, "id").unwrap_or_default().to_string(),
        email: row_str(row, "email").unwrap_or_default().to_string(),
        name: row_str(row, "name").unwrap_or_default().to_string(),
        role: Role::Admin,
    }
}
