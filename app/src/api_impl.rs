//! Business logic behind the server functions in [`crate::api`], kept out of
//! the `#[server]` macro so it can be tested directly.

use crate::auth::{AdminAuthority, LoginOutcome, validate_fields};
use crate::backend::BookingBackend;
use crate::error::{BookingError, Result};
use crate::types::{BookingRecord, CabType};
use chrono::Utc;
use tracing::{debug, info};

fn require_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(BookingError::Validation("Missing id".to_string()));
    }
    Ok(id)
}

pub async fn fetch_booking_impl(
    backend: &impl BookingBackend,
    id: &str,
    token: Option<&str>,
) -> Result<Option<BookingRecord>> {
    let id = require_id(id)?;
    debug!("Fetching booking {} (authenticated: {})", id, token.is_some());
    backend.booking_by_id(id, token.filter(|t| !t.is_empty())).await
}

pub async fn fetch_cab_type_impl(
    backend: &impl BookingBackend,
    id: &str,
) -> Result<Option<CabType>> {
    let id = require_id(id)?;
    debug!("Fetching cab type {}", id);
    backend.cab_type_by_id(id).await
}

/// Validation failures are answered immediately; everything else waits out
/// the fixed gate delay first.
pub async fn admin_login_impl(
    authority: &AdminAuthority,
    email: &str,
    password: &str,
) -> Result<LoginOutcome> {
    validate_fields(email, password)?;
    tokio::time::sleep(authority.delay()).await;
    authority.login(email, password, Utc::now())
}

pub fn verify_session_impl(authority: &AdminAuthority, token: &str) -> bool {
    authority.registry().verify(token, Utc::now()).is_some()
}

pub fn logout_impl(authority: &AdminAuthority, token: &str) -> bool {
    let revoked = authority.registry().revoke(token);
    if revoked {
        info!("Admin session revoked");
    }
    revoked
}
