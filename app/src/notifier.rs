use crate::error::{BookingError, Result};
use crate::types::BookingSummary;
use std::time::Duration;
use tracing::{error, info};

/// Simulated delivery time of a confirmation email.
pub const SEND_DELAY: Duration = Duration::from_millis(2000);

/// User-visible notice raised by a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// State of the "send confirmation email" action.
///
/// No message actually leaves the browser; delivery is a timed stand-in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfirmationMailer {
    in_flight: bool,
    sent: bool,
}

impl ConfirmationMailer {
    pub fn new(sent: bool) -> Self {
        Self {
            in_flight: false,
            sent,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_sent(&self) -> bool {
        self.sent
    }

    pub fn can_send(&self, summary: &BookingSummary) -> bool {
        !summary.email.is_empty() && !self.in_flight
    }

    /// Start a send. Returns the recipient, or `None` when the action is
    /// disabled or a send is already running.
    pub fn begin(&mut self, summary: &BookingSummary) -> Option<String> {
        if !self.can_send(summary) {
            return None;
        }
        self.in_flight = true;
        Some(summary.email.clone())
    }

    /// Finish the running send and produce the notice to show.
    pub fn finish(&mut self, recipient: &str, outcome: Result<()>) -> Notice {
        self.in_flight = false;
        match outcome {
            Ok(()) => {
                self.sent = true;
                info!("Confirmation email sent to {}", recipient);
                Notice::success(format!("Confirmation email sent to {recipient}"))
            }
            Err(e) => {
                error!("Error in email simulation: {}", e);
                Notice::error("Failed to send email. Please try again.")
            }
        }
    }
}

/// Plain-text body of the confirmation email.
pub fn confirmation_body(summary: &BookingSummary) -> Result<String> {
    if summary.email.is_empty() {
        return Err(BookingError::Validation(
            "No email address on booking".to_string(),
        ));
    }

    Ok(format!(
        "Booking {id} confirmed\n{from} → {to}\nCab: {cab}\nTravel date: {travel}\nAmount: {price} ({payment})",
        id = summary.id,
        from = summary.from,
        to = summary.to,
        cab = summary.cab_type,
        travel = summary.travel_date,
        price = summary.price,
        payment = summary.payment_method,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn summary(email: &str) -> BookingSummary {
        BookingSummary {
            id: "BK123".to_string(),
            date: "6/1/2025".to_string(),
            time: "10:30 AM".to_string(),
            from: "CityA".to_string(),
            to: "CityB".to_string(),
            cab_type: "Standard Cab".to_string(),
            price: "₹1500".to_string(),
            payment_method: "Online Payment".to_string(),
            travel_date: "6/1/2025".to_string(),
            email: email.to_string(),
            mobile: None,
        }
    }

    #[test]
    fn test_second_begin_while_in_flight_is_ignored() {
        let booking = summary("rider@example.com");
        let mut mailer = ConfirmationMailer::default();

        assert_eq!(mailer.begin(&booking).as_deref(), Some("rider@example.com"));
        assert_eq!(mailer.begin(&booking), None);
        assert!(mailer.is_in_flight());

        let notice = mailer.finish("rider@example.com", Ok(()));
        assert_eq!(notice.kind, NoticeKind::Success);
        assert!(mailer.is_sent());
        assert!(!mailer.is_in_flight());
    }

    #[test]
    fn test_disabled_without_email() {
        let mut mailer = ConfirmationMailer::default();
        assert!(!mailer.can_send(&summary("")));
        assert_eq!(mailer.begin(&summary("")), None);
    }

    #[test]
    fn test_failure_clears_in_flight_and_reports_error() {
        let booking = summary("rider@example.com");
        let mut mailer = ConfirmationMailer::default();
        mailer.begin(&booking);

        let notice = mailer.finish(
            "rider@example.com",
            Err(BookingError::BackendUnavailable("offline".to_string())),
        );
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "Failed to send email. Please try again.");
        assert!(!mailer.is_in_flight());
        assert!(!mailer.is_sent());
        assert!(mailer.can_send(&booking));
    }

    #[test]
    fn test_confirmation_body() {
        let body = confirmation_body(&summary("rider@example.com")).unwrap();
        assert!(body.contains("Booking BK123 confirmed"));
        assert!(body.contains("CityA → CityB"));
        assert!(confirmation_body(&summary("")).is_err());
    }
}
