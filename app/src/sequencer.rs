//! Confirmation overlay sequence.
//!
//! ```text
//! online: Idle --500ms--> Paying --2000ms--> Confirming --3000ms--> Redirected
//! cod:    Idle --500ms--> Confirming --3000ms--> Redirected
//! ```
//!
//! The machine itself holds no timers. The page schedules one timeout per
//! [`Sequencer::pending_delay`] and calls [`Sequencer::advance`] when it
//! fires. Once [`Sequencer::cancel`] has been called no further transition
//! happens, so a timer that outlives the page cannot navigate.

use crate::types::{BookingQuery, PaymentMethod};
use std::time::Duration;

pub const INITIAL_DELAY: Duration = Duration::from_millis(500);
pub const PAYMENT_OVERLAY_DURATION: Duration = Duration::from_millis(2000);
pub const CONFIRMED_OVERLAY_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Paying,
    Confirming,
    Redirected,
    Cancelled,
}

impl Phase {
    pub fn shows_payment_overlay(self) -> bool {
        self == Self::Paying
    }

    pub fn shows_confirmed_overlay(self) -> bool {
        matches!(self, Self::Confirming | Self::Redirected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequencer {
    method: PaymentMethod,
    phase: Phase,
    redirect: Option<String>,
}

impl Sequencer {
    /// `redirect` is the details URL to open at the end; without one the
    /// sequence stops on the confirmed overlay.
    pub fn new(method: PaymentMethod, redirect: Option<String>) -> Self {
        Self {
            method,
            phase: Phase::Idle,
            redirect,
        }
    }

    pub fn for_query(query: &BookingQuery) -> Self {
        Self::new(query.payment_method(), redirect_url(query))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    /// Delay before the next transition, `None` when the sequence is over.
    pub fn pending_delay(&self) -> Option<Duration> {
        match self.phase {
            Phase::Idle => Some(INITIAL_DELAY),
            Phase::Paying => Some(PAYMENT_OVERLAY_DURATION),
            Phase::Confirming if self.redirect.is_some() => Some(CONFIRMED_OVERLAY_DURATION),
            Phase::Confirming | Phase::Redirected | Phase::Cancelled => None,
        }
    }

    /// Take the next transition. Returns the new phase, or `None` if the
    /// sequence was already over or cancelled.
    pub fn advance(&mut self) -> Option<Phase> {
        self.pending_delay()?;
        self.phase = match (self.phase, self.method) {
            (Phase::Idle, PaymentMethod::Online) => Phase::Paying,
            (Phase::Idle | Phase::Paying, _) => Phase::Confirming,
            (Phase::Confirming, _) => Phase::Redirected,
            (phase, _) => phase,
        };
        Some(self.phase)
    }

    pub fn cancel(&mut self) {
        self.phase = Phase::Cancelled;
    }

    /// Navigation target, only once the sequence reached `Redirected`.
    pub fn redirect_target(&self) -> Option<&str> {
        if self.phase == Phase::Redirected {
            self.redirect.as_deref()
        } else {
            None
        }
    }
}

/// Booking details URL with the parameters carried forward from the
/// confirmation page. `None` without a booking id.
pub fn redirect_url(query: &BookingQuery) -> Option<String> {
    let booking_id = query.booking_id.as_deref()?;

    let mut params = vec![format!(
        "paymentStatus={}",
        query.payment_method().redirect_status()
    )];
    let carried = [
        ("from", &query.from),
        ("to", &query.to),
        ("cabName", &query.cab_name),
        ("amount", &query.amount),
        ("date", &query.date),
        ("time", &query.time),
        ("distance", &query.distance),
    ];
    params.extend(carried.iter().filter_map(|(key, value)| {
        value
            .as_deref()
            .map(|v| format!("{key}={}", urlencoding::encode(v)))
    }));

    Some(format!(
        "/booking/{}?{}",
        urlencoding::encode(booking_id),
        params.join("&")
    ))
}
