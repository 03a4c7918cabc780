//! Admin gate flow tests against an in-memory store
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use app::auth::{AdminAuthority, CredentialPair, current_session, sign_in, sign_out};
use app::error::BookingError;
use app::storage::{ADMIN_AUTH_KEY, KeyValueStore, MemoryStore};
use std::time::Duration;

fn authority() -> AdminAuthority {
    AdminAuthority::new(
        CredentialPair::default(),
        chrono::Duration::hours(24),
        Duration::ZERO,
    )
}

#[tokio::test]
async fn test_empty_fields_never_touch_storage() {
    let store = MemoryStore::new();
    let authority = authority();

    for (email, password) in [("", ""), ("admin@UrbanRide.com", ""), ("", "admin123")] {
        let err = sign_in(&store, &authority, email, password).await.unwrap_err();
        assert_eq!(err.to_string(), "Please fill in all fields");
    }
    assert!(store.is_empty());
    assert!(authority.registry().is_empty());
}

#[tokio::test]
async fn test_wrong_credentials_are_rejected_without_write() {
    let store = MemoryStore::new();
    let authority = authority();

    let err = sign_in(&store, &authority, "admin@UrbanRide.com", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::AuthMismatch));
    assert!(store.get(ADMIN_AUTH_KEY).is_none());
}

#[tokio::test]
async fn test_successful_login_persists_marker() {
    let store = MemoryStore::new();
    let authority = authority();

    let marker = sign_in(&store, &authority, "admin@UrbanRide.com", "admin123")
        .await
        .unwrap();
    assert!(marker.is_admin);
    assert_eq!(marker.name, "Admin User");

    let raw: serde_json::Value =
        serde_json::from_str(&store.get(ADMIN_AUTH_KEY).unwrap()).unwrap();
    assert_eq!(raw["isAdmin"], true);
    assert_eq!(raw["email"], "admin@UrbanRide.com");

    let session = current_session(&store).unwrap();
    assert_eq!(
        authority
            .registry()
            .verify(&session.token, chrono::Utc::now())
            .as_deref(),
        Some("admin@UrbanRide.com")
    );
}

#[tokio::test]
async fn test_sign_out_clears_marker() {
    let store = MemoryStore::new();
    let authority = authority();
    sign_in(&store, &authority, "admin@UrbanRide.com", "admin123")
        .await
        .unwrap();

    assert!(sign_out(&store).is_some());
    assert!(current_session(&store).is_none());
    assert!(sign_out(&store).is_none());
}
