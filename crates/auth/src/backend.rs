//! Backend auth subsystem port.
//!
//! Administrators do not carry a local `password_hash`; their credentials
//! are verified by the hosted auth service. [`AuthBackend`] is the seam
//! the sign-in flow programs against, [`RestAuthBackend`] speaks the
//! service's HTTP API, and [`StubAuthBackend`] scripts outcomes in tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use pressroom_store::RestStoreConfig;
use serde::Deserialize;
use uuid::Uuid;

/// Subject reported by the backend auth service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackendUser {
    pub id: String,
    pub email: String,
}

/// Failures from the backend auth service.
#[derive(Debug, thiserror::Error)]
pub enum BackendAuthError {
    /// The request never produced a response.
    #[error("auth request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("auth service returned {status}: {body}")]
    Service { status: u16, body: String },
}

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// Credential verification and session state held by the auth service.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Verify credentials. Success always carries the signed-in user.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<BackendUser, BackendAuthError>;

    /// The currently signed-in backend user, if any.
    async fn session(&self) -> Option<BackendUser>;

    /// End the backend-held session.
    async fn sign_out(&self) -> Result<(), BackendAuthError>;
}

// ---------------------------------------------------------------------------
// REST binding
// ---------------------------------------------------------------------------

/// Password-grant token response from the auth service.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: BackendUser,
}

struct HeldSession {
    access_token: String,
    user: BackendUser,
}

/// An [`AuthBackend`] over the auth service's HTTP API.
///
/// The access token from a successful password grant is held in memory
/// and presented on sign-out; [`session`](AuthBackend::session) reports
/// the held user without a network round trip.
pub struct RestAuthBackend {
    client: reqwest::Client,
    url: String,
    api_key: String,
    held: RwLock<Option<HeldSession>>,
}

impl RestAuthBackend {
    /// Shares connection settings with the record store; the auth service
    /// lives under `/auth/v1` on the same host.
    pub fn new(config: &RestStoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            held: RwLock::new(None),
        }
    }

    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, BackendAuthError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(BackendAuthError::Service {
            status: status.as_u16(),
            body,
        })
    }
}

#[derive(serde::Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[async_trait]
impl AuthBackend for RestAuthBackend {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<BackendUser, BackendAuthError> {
        let response = self
            .client
            .post(format!("{}/auth/v1/token", self.url))
            .query(&[("grant_type", "password")])
            .header("apikey", self.api_key.as_str())
            .json(&PasswordGrant { email, password })
            .send()
            .await?;
        let token: TokenResponse = Self::ensure_success(response).await?.json().await?;

        let user = token.user.clone();
        *self.held.write().unwrap_or_else(PoisonError::into_inner) = Some(HeldSession {
            access_token: token.access_token,
            user: token.user,
        });
        Ok(user)
    }

    async fn session(&self) -> Option<BackendUser> {
        self.held
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|held| held.user.clone())
    }

    async fn sign_out(&self) -> Result<(), BackendAuthError> {
        let Some(access_token) = self
            .held
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|held| held.access_token.clone())
        else {
            return Ok(());
        };

        let response = self
            .client
            .post(format!("{}/auth/v1/logout", self.url))
            .header("apikey", self.api_key.as_str())
            .bearer_auth(access_token)
            .send()
            .await?;
        Self::ensure_success(response).await?;

        *self.held.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Test stub
// ---------------------------------------------------------------------------

struct StubUser {
    user: BackendUser,
    password: String,
}

/// Scriptable in-memory [`AuthBackend`].
#[derive(Default)]
pub struct StubAuthBackend {
    users: RwLock<HashMap<String, StubUser>>,
    session: RwLock<Option<BackendUser>>,
    fail_sign_out: AtomicBool,
}

impl StubAuthBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register credentials the stub will accept.
    pub fn register(&self, email: &str, password: &str) -> BackendUser {
        let user = BackendUser {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
        };
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                email.to_lowercase(),
                StubUser {
                    user: user.clone(),
                    password: password.to_string(),
                },
            );
        user
    }

    /// Seed a signed-in backend session directly.
    pub fn open_session(&self, user: BackendUser) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(user);
    }

    /// Make the next `sign_out` call fail.
    pub fn fail_next_sign_out(&self) {
        self.fail_sign_out.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuthBackend for StubAuthBackend {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<BackendUser, BackendAuthError> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        match users.get(&email.to_lowercase()) {
            Some(stub) if stub.password == password => {
                let user = stub.user.clone();
                drop(users);
                self.open_session(user.clone());
                Ok(user)
            }
            // The deployed service does not distinguish a wrong password
            // from an unknown email.
            _ => Err(BackendAuthError::Service {
                status: 400,
                body: "invalid_grant".to_string(),
            }),
        }
    }

    async fn session(&self) -> Option<BackendUser> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn sign_out(&self) -> Result<(), BackendAuthError> {
        if self.fail_sign_out.swap(false, Ordering::SeqCst) {
            return Err(BackendAuthError::Service {
                status: 503,
                body: "sign-out unavailable".to_string(),
            });
        }
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
