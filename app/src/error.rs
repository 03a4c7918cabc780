use std::fmt;

#[derive(Debug)]
pub enum BookingError {
    Validation(String),
    AuthMismatch,
    BackendUnavailable(String),
    #[cfg(feature = "ssr")]
    Http(reqwest::Error),
    NotFound(String),
    InvalidResponse(String),
    Storage(String),
    Config(String),
    UnexpectedResolution(String),
}

impl fmt::Display for BookingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "{msg}"),
            Self::AuthMismatch => write!(f, "Invalid credentials"),
            Self::BackendUnavailable(msg) => write!(f, "Backend unavailable: {msg}"),
            #[cfg(feature = "ssr")]
            Self::Http(e) => write!(f, "HTTP error: {e}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::InvalidResponse(msg) => write!(f, "Invalid response: {msg}"),
            Self::Storage(msg) => write!(f, "Storage error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::UnexpectedResolution(msg) => write!(f, "Unexpected resolution error: {msg}"),
        }
    }
}

impl std::error::Error for BookingError {}

impl BookingError {
    /// Failures that the resolver degrades past instead of escalating to the
    /// minimal summary.
    pub fn is_backend_failure(&self) -> bool {
        match self {
            Self::BackendUnavailable(_) | Self::NotFound(_) | Self::InvalidResponse(_) => true,
            #[cfg(feature = "ssr")]
            Self::Http(_) => true,
            _ => false,
        }
    }
}

#[cfg(feature = "ssr")]
impl From<reqwest::Error> for BookingError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            Self::BackendUnavailable(e.to_string())
        } else {
            Self::Http(e)
        }
    }
}

impl From<serde_json::Error> for BookingError {
    fn from(e: serde_json::Error) -> Self {
        Self::Storage(format!("malformed JSON: {e}"))
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;
