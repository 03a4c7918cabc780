use app::error::BookingError;

#[test]
fn test_validation_error_display_is_the_message() {
    let err = BookingError::Validation("Please fill in all fields".to_string());
    assert_eq!(err.to_string(), "Please fill in all fields");
}

#[test]
fn test_auth_mismatch_display() {
    assert_eq!(BookingError::AuthMismatch.to_string(), "Invalid credentials");
}

#[test]
fn test_backend_unavailable_display() {
    let err = BookingError::BackendUnavailable("timeout".to_string());
    assert_eq!(err.to_string(), "Backend unavailable: timeout");
}

#[test]
fn test_storage_error_display() {
    let err = BookingError::Storage("quota exceeded".to_string());
    assert_eq!(err.to_string(), "Storage error: quota exceeded");
}

#[test]
fn test_config_error_display() {
    let err = BookingError::Config("SESSION_TTL_SECS must be positive".to_string());
    assert_eq!(
        err.to_string(),
        "Configuration error: SESSION_TTL_SECS must be positive"
    );
}

#[test]
fn test_backend_failure_classification() {
    assert!(BookingError::NotFound("x".into()).is_backend_failure());
    assert!(BookingError::InvalidResponse("x".into()).is_backend_failure());
    assert!(BookingError::BackendUnavailable("x".into()).is_backend_failure());
    assert!(!BookingError::Storage("x".into()).is_backend_failure());
    assert!(!BookingError::AuthMismatch.is_backend_failure());
}

#[test]
fn test_json_error_converts_to_storage() {
    let json_err = serde_json::from_str::<Vec<String>>("{oops").unwrap_err();
    let err: BookingError = json_err.into();
    assert!(matches!(err, BookingError::Storage(_)));
    assert!(err.to_string().starts_with("Storage error: malformed JSON"));
}
