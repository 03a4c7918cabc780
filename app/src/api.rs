use crate::auth::LoginOutcome;
use crate::types::{BookingRecord, CabType};
use leptos::prelude::*;

#[cfg(feature = "ssr")]
use std::sync::Arc;

#[cfg(feature = "ssr")]
use crate::{api_impl, auth::AdminAuthority, backend::HttpBackend};

/// Get the REST backend from Leptos context
#[cfg(feature = "ssr")]
pub fn get_backend_from_context() -> Result<Arc<HttpBackend>, ServerFnError> {
    use_context::<Arc<HttpBackend>>()
        .ok_or_else(|| ServerFnError::new("Booking backend is not configured"))
}

/// Get the admin authority from Leptos context
#[cfg(feature = "ssr")]
pub fn get_authority_from_context() -> Result<Arc<AdminAuthority>, ServerFnError> {
    use_context::<Arc<AdminAuthority>>()
        .ok_or_else(|| ServerFnError::new("Admin authority is not configured"))
}

/// Fetch a booking by id from the REST backend
#[server(endpoint = "get_booking")]
pub async fn get_booking(
    id: String,
    token: Option<String>,
) -> Result<Option<BookingRecord>, ServerFnError> {
    let backend = get_backend_from_context()?;
    api_impl::fetch_booking_impl(backend.as_ref(), &id, token.as_deref())
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

/// Fetch a cab type by id from the REST backend
#[server(endpoint = "get_cab_type")]
pub async fn get_cab_type(id: String) -> Result<Option<CabType>, ServerFnError> {
    let backend = get_backend_from_context()?;
    api_impl::fetch_cab_type_impl(backend.as_ref(), &id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[server(endpoint = "admin_login")]
pub async fn admin_login(email: String, password: String) -> Result<LoginOutcome, ServerFnError> {
    let authority = get_authority_from_context()?;
    api_impl::admin_login_impl(&authority, &email, &password)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[server(endpoint = "verify_admin_session")]
pub async fn verify_admin_session(token: String) -> Result<bool, ServerFnError> {
    let authority = get_authority_from_context()?;
    Ok(api_impl::verify_session_impl(&authority, &token))
}

#[server(endpoint = "admin_logout")]
pub async fn admin_logout(token: String) -> Result<(), ServerFnError> {
    let authority = get_authority_from_context()?;
    api_impl::logout_impl(&authority, &token);
    Ok(())
}
