//! Business logic extracted from Leptos components for testability.
//!
//! Pure functions used by the `#[component]` bodies in
//! [`crate::components`], kept here so they can be unit tested without a
//! reactive runtime.

use crate::error::BookingError;
use crate::notifier::{ConfirmationMailer, Notice, NoticeKind};
use crate::types::BookingQuery;

/// Query keys read by the booking pages.
pub const QUERY_KEYS: [&str; 16] = [
    "bookingId",
    "method",
    "from",
    "to",
    "cabName",
    "amount",
    "date",
    "time",
    "distance",
    "email",
    "mobile",
    "travelDate",
    "travelTime",
    "paymentMethod",
    "cabId",
    "type",
];

/// Build a [`BookingQuery`] from a lookup function over the URL query.
pub fn query_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> BookingQuery {
    BookingQuery::from_pairs(
        QUERY_KEYS
            .iter()
            .filter_map(|key| lookup(key).map(|value| (*key, value))),
    )
}

// === Notices ===

/// Toasts kept on screen at once; older ones are dropped first.
pub const MAX_NOTICES: usize = 4;

/// Append `entry`, dropping the oldest entries beyond `cap`.
pub fn push_capped<T>(list: &mut Vec<T>, entry: T, cap: usize) {
    list.push(entry);
    if list.len() > cap {
        let excess = list.len() - cap;
        list.drain(..excess);
    }
}

pub fn notice_class(kind: NoticeKind) -> &'static str {
    match kind {
        NoticeKind::Success => "notice notice-success",
        NoticeKind::Error => "notice notice-error",
    }
}

/// Notice shown for a failed admin sign-in.
pub fn login_error_notice(error: &BookingError) -> Notice {
    match error {
        BookingError::Validation(msg) => Notice::error(msg.clone()),
        BookingError::AuthMismatch => Notice::error("Invalid credentials"),
        other => Notice::error(format!("Login failed: {other}")),
    }
}

pub fn login_button_label(is_loading: bool) -> &'static str {
    if is_loading { "Signing in..." } else { "Sign in" }
}

// === Confirmation page ===

pub fn email_button_label(mailer: &ConfirmationMailer) -> &'static str {
    if mailer.is_in_flight() {
        "Sending..."
    } else if mailer.is_sent() {
        "Resend Confirmation Email"
    } else {
        "Send Confirmation Email"
    }
}

pub fn email_status_text(mailer: &ConfirmationMailer, email: &str) -> String {
    if email.is_empty() {
        "No email address on this booking".to_string()
    } else if mailer.is_sent() {
        format!("Confirmation sent to {email}")
    } else {
        format!("We can send the details to {email}")
    }
}

// === Booking details page ===

pub fn payment_status_text(status: Option<&str>) -> &'static str {
    match status {
        Some("success") => "Paid",
        Some("pending") => "Payment Pending",
        _ => "Unknown",
    }
}

pub fn payment_status_badge_class(status: Option<&str>) -> &'static str {
    match status {
        Some("success") => "badge-success",
        Some("pending") => "badge-warning",
        _ => "badge-neutral",
    }
}

/// Label/value rows shown on the details page, skipping absent values.
pub fn detail_rows(query: &BookingQuery) -> Vec<(&'static str, String)> {
    [
        ("From", query.from.clone()),
        ("To", query.to.clone()),
        ("Cab", query.cab_name.clone()),
        ("Amount", query.amount.as_deref().map(crate::types::format_price)),
        ("Date", query.date.clone()),
        ("Time", query.time.clone()),
        ("Distance", query.distance.as_ref().map(|d| format!("{d} km"))),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.map(|v| (label, v)))
    .collect()
}
