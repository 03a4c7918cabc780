use crate::auth::{AdminAuthority, CredentialPair, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD};
use crate::backend::HttpBackend;
use crate::error::{BookingError, Result};
use std::time::Duration;

/// Longest accepted admin session lifetime (ten years).
pub const MAX_SESSION_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub backend_timeout_secs: u64,
    pub admin: CredentialPair,
    pub session_ttl_secs: i64,
    pub login_delay_ms: u64,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_url =
            dotenvy::var("API_URL").unwrap_or_else(|_| "http://localhost:5000/api".to_string());

        let backend_timeout_secs = parse_env("BACKEND_TIMEOUT_SECS", 10_u64)?;
        let session_ttl_secs = parse_env("SESSION_TTL_SECS", 86_400_i64)?;
        let login_delay_ms = parse_env("LOGIN_DELAY_MS", 1000_u64)?;

        if session_ttl_secs <= 0 {
            return Err(BookingError::Config(
                "SESSION_TTL_SECS must be positive".to_string(),
            ));
        }
        if session_ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(BookingError::Config("Invalid SESSION_TTL_SECS".to_string()));
        }

        let admin = CredentialPair {
            email: required_or("ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL)?,
            password: required_or("ADMIN_PASSWORD", DEFAULT_ADMIN_PASSWORD)?,
        };

        let bind_addr = dotenvy::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

        Ok(Config {
            api_url,
            backend_timeout_secs,
            admin,
            session_ttl_secs,
            login_delay_ms,
            bind_addr,
        })
    }

    pub fn backend(&self) -> Result<HttpBackend> {
        HttpBackend::new(
            self.api_url.clone(),
            Duration::from_secs(self.backend_timeout_secs),
        )
    }

    pub fn authority(&self) -> Result<AdminAuthority> {
        let ttl = chrono::Duration::try_seconds(self.session_ttl_secs)
            .ok_or_else(|| BookingError::Config("Invalid SESSION_TTL_SECS".to_string()))?;
        Ok(AdminAuthority::new(
            self.admin.clone(),
            ttl,
            Duration::from_millis(self.login_delay_ms),
        ))
    }
}

fn parse_env<T: std::str::FromStr + ToString>(key: &str, default: T) -> Result<T> {
    dotenvy::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .map_err(|_| BookingError::Config(format!("Invalid {key}")))
}

fn required_or(key: &str, default: &str) -> Result<String> {
    match dotenvy::var(key) {
        Ok(value) if value.is_empty() => Err(BookingError::Config(format!("{key} is empty"))),
        Ok(value) => Ok(value),
        Err(_) => Ok(default.to_string()),
    }
}
