//! Environment-driven configuration tests
#![cfg(feature = "ssr")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use app::config::{Config, MAX_SESSION_TTL_SECS};
use app::error::BookingError;
use serial_test::serial;
use temp_env::with_vars;

const KEYS: [&str; 7] = [
    "API_URL",
    "BACKEND_TIMEOUT_SECS",
    "ADMIN_EMAIL",
    "ADMIN_PASSWORD",
    "SESSION_TTL_SECS",
    "LOGIN_DELAY_MS",
    "BIND_ADDR",
];

/// Every config key, unset unless overridden.
fn env(overrides: &[(&'static str, &'static str)]) -> Vec<(&'static str, Option<&'static str>)> {
    KEYS.iter()
        .map(|key| {
            let value = overrides.iter().find(|(k, _)| k == key).map(|(_, v)| *v);
            (*key, value)
        })
        .collect()
}

#[test]
#[serial]
fn test_defaults() {
    with_vars(env(&[]), || {
        let config = Config::from_env().unwrap();
        assert_eq!(config.api_url, "http://localhost:5000/api");
        assert_eq!(config.backend_timeout_secs, 10);
        assert_eq!(config.admin.email, "admin@UrbanRide.com");
        assert_eq!(config.admin.password, "admin123");
        assert_eq!(config.session_ttl_secs, 86_400);
        assert_eq!(config.login_delay_ms, 1000);
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
    });
}

#[test]
#[serial]
fn test_overrides() {
    let vars = env(&[
        ("API_URL", "http://bookings.internal/api/"),
        ("ADMIN_EMAIL", "ops@example.com"),
        ("LOGIN_DELAY_MS", "0"),
    ]);
    with_vars(vars, || {
        let config = Config::from_env().unwrap();
        assert_eq!(config.admin.email, "ops@example.com");
        assert_eq!(config.login_delay_ms, 0);
        assert_eq!(config.backend().unwrap().base_url(), "http://bookings.internal/api");
    });
}

#[test]
#[serial]
fn test_invalid_number_is_config_error() {
    let vars = env(&[("BACKEND_TIMEOUT_SECS", "soon")]);
    with_vars(vars, || {
        assert!(matches!(Config::from_env(), Err(BookingError::Config(_))));
    });
}

#[test]
#[serial]
fn test_non_positive_ttl_is_rejected() {
    let vars = env(&[("SESSION_TTL_SECS", "0")]);
    with_vars(vars, || {
        assert!(matches!(Config::from_env(), Err(BookingError::Config(_))));
    });
}

#[test]
#[serial]
fn test_oversized_ttl_is_rejected() {
    for ttl in ["1000000000000000", "9223372036854775807"] {
        with_vars(env(&[("SESSION_TTL_SECS", ttl)]), || {
            let err = Config::from_env().unwrap_err();
            assert_eq!(err.to_string(), "Configuration error: Invalid SESSION_TTL_SECS");
        });
    }
}

#[test]
#[serial]
fn test_max_ttl_builds_authority() {
    let max = MAX_SESSION_TTL_SECS.to_string();
    let vars = vec![("SESSION_TTL_SECS", Some(max.as_str()))];
    with_vars(vars, || {
        let authority = Config::from_env().unwrap().authority().unwrap();
        let marker = authority
            .registry()
            .issue("admin@UrbanRide.com", chrono::Utc::now())
            .unwrap();
        assert!(marker.expires_at.is_some());
    });
}

#[test]
#[serial]
fn test_empty_admin_password_is_rejected() {
    let vars = env(&[("ADMIN_PASSWORD", "")]);
    with_vars(vars, || {
        let err = Config::from_env().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: ADMIN_PASSWORD is empty");
    });
}
