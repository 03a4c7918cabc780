//! Admin session gate.
//!
//! Credentials are compared on the server against the configured pair. A
//! successful check issues an opaque, expiring token; the browser keeps the
//! resulting [`SessionMarker`] under `adminAuth`.

use crate::error::{BookingError, Result};
use crate::storage::{ADMIN_AUTH_KEY, KeyValueStore, read_json, write_json};
use crate::types::SessionMarker;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@UrbanRide.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
pub const ADMIN_DISPLAY_NAME: &str = "Admin User";

#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl Default for CredentialPair {
    fn default() -> Self {
        Self {
            email: DEFAULT_ADMIN_EMAIL.to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

/// Both fields are required before anything else happens.
pub fn validate_fields(email: &str, password: &str) -> Result<()> {
    if email.is_empty() || password.is_empty() {
        return Err(BookingError::Validation(
            "Please fill in all fields".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginOutcome {
    Granted(SessionMarker),
    Rejected,
}

#[derive(Debug, Clone)]
struct Session {
    email: String,
    expires_at: DateTime<Utc>,
}

/// Issued admin sessions, keyed by token.
#[derive(Debug)]
pub struct SessionRegistry {
    ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn issue(&self, email: &str, now: DateTime<Utc>) -> Result<SessionMarker> {
        let token = Uuid::new_v4().to_string();
        let expires_at = now.checked_add_signed(self.ttl).ok_or_else(|| {
            BookingError::Config("session lifetime out of range".to_string())
        })?;

        self.sessions
            .write()
            .map_err(|e| BookingError::Storage(format!("session registry poisoned: {e}")))?
            .insert(
                token.clone(),
                Session {
                    email: email.to_string(),
                    expires_at,
                },
            );

        Ok(SessionMarker {
            is_admin: true,
            email: email.to_string(),
            name: ADMIN_DISPLAY_NAME.to_string(),
            token,
            expires_at: Some(expires_at.to_rfc3339()),
        })
    }

    /// Email of the live session behind `token`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Option<String> {
        let sessions = self.sessions.read().ok()?;
        let session = sessions.get(token)?;
        (session.expires_at > now).then(|| session.email.clone())
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.sessions
            .write()
            .map(|mut s| s.remove(token).is_some())
            .unwrap_or(false)
    }

    /// Drop expired sessions, returning how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let Ok(mut sessions) = self.sessions.write() else {
            return 0;
        };
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Server-side holder of the credential pair and the issued sessions.
#[derive(Debug)]
pub struct AdminAuthority {
    credentials: CredentialPair,
    registry: SessionRegistry,
    delay: std::time::Duration,
}

impl AdminAuthority {
    pub fn new(credentials: CredentialPair, ttl: Duration, delay: std::time::Duration) -> Self {
        Self {
            credentials,
            registry: SessionRegistry::new(ttl),
            delay,
        }
    }

    /// Fixed pause applied before every credential check.
    pub fn delay(&self) -> std::time::Duration {
        self.delay
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Exact, case-sensitive comparison against the configured pair.
    pub fn check(&self, email: &str, password: &str) -> Result<()> {
        validate_fields(email, password)?;
        if email == self.credentials.email && password == self.credentials.password {
            Ok(())
        } else {
            Err(BookingError::AuthMismatch)
        }
    }

    pub fn login(&self, email: &str, password: &str, now: DateTime<Utc>) -> Result<LoginOutcome> {
        match self.check(email, password) {
            Ok(()) => {
                info!("Admin login granted for {}", email);
                Ok(LoginOutcome::Granted(self.registry.issue(email, now)?))
            }
            Err(BookingError::AuthMismatch) => {
                warn!("Admin login rejected for {}", email);
                Ok(LoginOutcome::Rejected)
            }
            Err(e) => Err(e),
        }
    }
}

/// Where the browser sends credentials to be checked.
#[allow(async_fn_in_trait)]
pub trait Authenticator {
    async fn authenticate(&self, email: &str, password: &str) -> Result<LoginOutcome>;
}

/// Checks credentials through the `admin_login` server function.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerFnAuthenticator;

impl Authenticator for ServerFnAuthenticator {
    async fn authenticate(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        crate::api::admin_login(email.to_string(), password.to_string())
            .await
            .map_err(|e| BookingError::BackendUnavailable(e.to_string()))
    }
}

impl Authenticator for AdminAuthority {
    async fn authenticate(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        self.login(email, password, Utc::now())
    }
}

/// Full gate flow: validate, authenticate, persist the session marker.
///
/// Storage is only written when access is granted.
pub async fn sign_in(
    store: &impl KeyValueStore,
    authenticator: &impl Authenticator,
    email: &str,
    password: &str,
) -> Result<SessionMarker> {
    validate_fields(email, password)?;

    match authenticator.authenticate(email, password).await? {
        LoginOutcome::Granted(marker) => {
            write_json(store, ADMIN_AUTH_KEY, &marker)?;
            Ok(marker)
        }
        LoginOutcome::Rejected => Err(BookingError::AuthMismatch),
    }
}

pub fn current_session(store: &impl KeyValueStore) -> Option<SessionMarker> {
    read_json::<SessionMarker>(store, ADMIN_AUTH_KEY)
        .ok()
        .flatten()
        .filter(|m| m.is_admin)
}

pub fn sign_out(store: &impl KeyValueStore) -> Option<SessionMarker> {
    let marker = current_session(store);
    store.remove(ADMIN_AUTH_KEY);
    marker
}
