//! Booking summary resolution.
//!
//! A summary is produced by trying a fixed, prioritised list of strategies
//! and keeping the first one that yields a result:
//!
//! 1. [`ResolutionSource::DirectParams`]: confirmation view, query string only.
//! 2. [`ResolutionSource::Backend`]: fetch the booking by id.
//! 3. [`ResolutionSource::Synthesized`]: assemble from cached cab data and the
//!    query string, then persist the result.
//!
//! Backend failures only move the chain forward. Any other failure yields the
//! [`ResolutionSource::Minimal`] summary, so callers always get a fully
//! populated [`BookingSummary`].

use crate::backend::BookingBackend;
use crate::error::{BookingError, Result};
use crate::storage::{
    BookingHistory, CabTypeCache, KeyValueStore, LAST_BOOKING_KEY, USER_EMAIL_KEY, write_json,
};
use crate::types::{
    BookingHistoryEntry, BookingQuery, BookingRecord, BookingSummary, CabType, DEFAULT_AMOUNT,
    DEFAULT_CAB_NAME, DEFAULT_FROM, DEFAULT_TO, LastBookingSnapshot, PaymentMethod, UserProfile,
    ViewKind, amount_text, apply_time, format_date, format_iso, format_price, format_time,
    parse_date,
};
use chrono::NaiveDateTime;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const CONFIRMED: &str = "confirmed";

/// Everything besides the query string that a resolution depends on.
#[derive(Debug, Clone)]
pub struct ResolveContext {
    pub view: ViewKind,
    pub now: NaiveDateTime,
    /// Number used for placeholder ids (`NEW-n`, `BKn`).
    pub suffix: u16,
    pub user: UserProfile,
}

/// Random placeholder suffix in `0..10000`.
pub fn random_suffix() -> u16 {
    (Uuid::new_v4().as_u128() % 10_000) as u16
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    DirectParams,
    Backend,
    Synthesized,
    Minimal,
}

impl ResolutionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DirectParams => "direct-params",
            Self::Backend => "backend",
            Self::Synthesized => "synthesized",
            Self::Minimal => "minimal",
        }
    }
}

/// Strategies in the order they are attempted.
pub const STRATEGIES: [ResolutionSource; 3] = [
    ResolutionSource::DirectParams,
    ResolutionSource::Backend,
    ResolutionSource::Synthesized,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub summary: BookingSummary,
    pub source: ResolutionSource,
    /// Failures that were degraded past instead of being surfaced.
    pub diagnostics: Vec<String>,
    /// The confirmation email counts as already delivered.
    pub email_sent: bool,
}

/// A page without a booking id needs both endpoints of the trip.
pub fn check_required(query: &BookingQuery) -> Result<()> {
    if query.booking_id.is_none() && (query.from.is_none() || query.to.is_none()) {
        return Err(BookingError::Validation(
            "Missing booking information".to_string(),
        ));
    }
    Ok(())
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn endpoint(value: Option<&String>, default: &str) -> String {
    value.cloned().unwrap_or_else(|| default.to_string())
}

// === Strategies ===

/// Strategy 1: only applies to the confirmation view.
pub fn from_query(query: &BookingQuery, ctx: &ResolveContext) -> Option<BookingSummary> {
    if ctx.view != ViewKind::Confirmation {
        return None;
    }

    let amount = query.amount.as_deref().unwrap_or(DEFAULT_AMOUNT);
    Some(BookingSummary {
        id: query
            .booking_id
            .clone()
            .unwrap_or_else(|| format!("NEW-{}", ctx.suffix)),
        date: format_date(ctx.now),
        time: format_time(ctx.now),
        from: endpoint(query.from.as_ref(), DEFAULT_FROM),
        to: endpoint(query.to.as_ref(), DEFAULT_TO),
        cab_type: query.cab_name_or_default(),
        price: format_price(amount),
        payment_method: query.payment_method().label().to_string(),
        travel_date: format_date(ctx.now),
        email: ctx.user.email.clone(),
        mobile: non_empty(&ctx.user.mobile),
    })
}

/// Booking id that strategy 2 should fetch, if it applies at all.
pub fn lookup_target<'q>(query: &'q BookingQuery, ctx: &ResolveContext) -> Option<&'q str> {
    if ctx.view == ViewKind::Confirmation {
        return None;
    }
    query
        .booking_id
        .as_deref()
        .filter(|id| !id.contains("confirmation"))
}

/// Strategy 2 mapping: backend fields first, then query, then literals.
pub fn from_record(
    record: &BookingRecord,
    booking_id: &str,
    query: &BookingQuery,
    ctx: &ResolveContext,
) -> BookingSummary {
    let amount = amount_text(record.fare.as_ref())
        .or_else(|| amount_text(record.total_amount.as_ref()))
        .or_else(|| query.amount.clone())
        .unwrap_or_else(|| DEFAULT_AMOUNT.to_string());

    let travel_date = record
        .pickup_date
        .as_deref()
        .or(record.travel_date.as_deref())
        .and_then(parse_date)
        .unwrap_or(ctx.now);

    BookingSummary {
        id: record
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| booking_id.to_string()),
        date: format_date(ctx.now),
        time: format_time(ctx.now),
        from: record
            .from_city
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| endpoint(query.from.as_ref(), DEFAULT_FROM)),
        to: record
            .to_city
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| endpoint(query.to.as_ref(), DEFAULT_TO)),
        cab_type: record
            .cab_type_name()
            .unwrap_or_else(|| query.cab_name_or_default()),
        price: format_price(&amount),
        payment_method: query.payment_method().label().to_string(),
        travel_date: format_date(travel_date),
        email: record
            .customer_email
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| ctx.user.email.clone()),
        mobile: record
            .customer_mobile
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| non_empty(&ctx.user.mobile)),
    }
}

/// Output of strategy 3 before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesized {
    pub summary: BookingSummary,
    pub snapshot: LastBookingSnapshot,
    pub history: BookingHistoryEntry,
}

/// Strategy 3 assembly from the query and an optionally resolved cab type.
pub fn synthesize(query: &BookingQuery, ctx: &ResolveContext, cab: Option<&CabType>) -> Synthesized {
    let cab_name = cab
        .and_then(|c| c.name.clone())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| query.cab_name_or_default());

    let amount = query
        .amount
        .clone()
        .or_else(|| cab.and_then(|c| amount_text(c.base_price.as_ref())))
        .unwrap_or_else(|| DEFAULT_AMOUNT.to_string());

    let mut travel = query
        .travel_date
        .as_deref()
        .and_then(parse_date)
        .unwrap_or(ctx.now);
    if let Some(raw) = query.travel_time.as_deref() {
        travel = apply_time(travel, raw);
    }

    let id = format!("BK{}", ctx.suffix);
    let payment_method = query
        .payment_method
        .clone()
        .unwrap_or_else(|| "online".to_string());

    let summary = BookingSummary {
        id: id.clone(),
        date: format_date(ctx.now),
        time: format_time(ctx.now),
        from: endpoint(query.from.as_ref(), DEFAULT_FROM),
        to: endpoint(query.to.as_ref(), DEFAULT_TO),
        cab_type: cab_name.clone(),
        price: format_price(&amount),
        payment_method: PaymentMethod::Online.label().to_string(),
        travel_date: format_date(travel),
        email: ctx.user.email.clone(),
        mobile: None,
    };

    let snapshot = LastBookingSnapshot {
        booking_id: id.clone(),
        from_city: query.from.clone(),
        to_city: query.to.clone(),
        cab_type: cab_name.clone(),
        cab_name: cab_name.clone(),
        amount: amount.clone(),
        payment_method: payment_method.clone(),
        travel_date: format_date(travel),
        travel_time: format_time(travel),
        status: CONFIRMED.to_string(),
        email: ctx.user.email.clone(),
        mobile: ctx.user.mobile.clone(),
        id: id.clone(),
    };

    let history = BookingHistoryEntry {
        id,
        from: query.from.clone(),
        to: query.to.clone(),
        date: format_iso(ctx.now),
        cab_name,
        amount,
        status: CONFIRMED.to_string(),
        payment_method,
    };

    Synthesized {
        summary,
        snapshot,
        history,
    }
}

/// Last-resort summary built from literals and whatever endpoints are known.
pub fn minimal(query: &BookingQuery, ctx: &ResolveContext, stored_email: Option<String>) -> BookingSummary {
    BookingSummary {
        id: format!("BK{}", ctx.suffix),
        date: format_date(ctx.now),
        time: format_time(ctx.now),
        from: endpoint(query.from.as_ref(), DEFAULT_FROM),
        to: endpoint(query.to.as_ref(), DEFAULT_TO),
        cab_type: DEFAULT_CAB_NAME.to_string(),
        price: format_price(DEFAULT_AMOUNT),
        payment_method: PaymentMethod::Online.label().to_string(),
        travel_date: format_date(ctx.now),
        email: stored_email.unwrap_or_default(),
        mobile: None,
    }
}

/// History entry recorded for every page load that carries a booking id.
pub fn visit_entry(query: &BookingQuery, ctx: &ResolveContext) -> Option<BookingHistoryEntry> {
    let id = query.booking_id.clone()?;
    Some(BookingHistoryEntry {
        id,
        from: query.from.clone(),
        to: query.to.clone(),
        date: format_iso(ctx.now),
        cab_name: query.cab_name_or_default(),
        amount: query.amount.clone().unwrap_or_else(|| "0".to_string()),
        status: CONFIRMED.to_string(),
        payment_method: query.method_or_default(),
    })
}

// === Resolver ===

pub struct BookingResolver<'a, B, S> {
    backend: &'a B,
    store: &'a S,
}

impl<'a, B: BookingBackend, S: KeyValueStore> BookingResolver<'a, B, S> {
    pub fn new(backend: &'a B, store: &'a S) -> Self {
        Self { backend, store }
    }

    /// Produce exactly one summary for this page load. Never fails.
    pub async fn resolve(&self, query: &BookingQuery, ctx: &ResolveContext) -> Resolution {
        let mut diagnostics = Vec::new();

        match self.run_chain(query, ctx, &mut diagnostics).await {
            Ok(resolution) => resolution,
            Err(e) => {
                error!("Error processing booking confirmation: {}", e);
                diagnostics.push(e.to_string());
                Resolution {
                    summary: minimal(query, ctx, self.store.get(USER_EMAIL_KEY)),
                    source: ResolutionSource::Minimal,
                    diagnostics,
                    email_sent: false,
                }
            }
        }
    }

    async fn run_chain(
        &self,
        query: &BookingQuery,
        ctx: &ResolveContext,
        diagnostics: &mut Vec<String>,
    ) -> Result<Resolution> {
        for source in STRATEGIES {
            let attempt = match source {
                ResolutionSource::DirectParams => from_query(query, ctx),
                ResolutionSource::Backend => self.lookup(query, ctx, diagnostics).await,
                ResolutionSource::Synthesized => {
                    Some(self.synthesize_and_persist(query, ctx, diagnostics).await?)
                }
                ResolutionSource::Minimal => None,
            };

            if let Some(summary) = attempt {
                info!("Resolved booking {} via {}", summary.id, source.as_str());
                let email_sent =
                    source == ResolutionSource::Synthesized && !summary.email.is_empty();
                return Ok(Resolution {
                    summary,
                    source,
                    diagnostics: std::mem::take(diagnostics),
                    email_sent,
                });
            }
        }

        Err(BookingError::UnexpectedResolution(
            "no strategy produced a summary".to_string(),
        ))
    }

    async fn lookup(
        &self,
        query: &BookingQuery,
        ctx: &ResolveContext,
        diagnostics: &mut Vec<String>,
    ) -> Option<BookingSummary> {
        let booking_id = lookup_target(query, ctx)?;

        match self
            .backend
            .booking_by_id(booking_id, ctx.user.token.as_deref())
            .await
        {
            Ok(Some(record)) => Some(from_record(&record, booking_id, query, ctx)),
            Ok(None) => {
                warn!("Booking {} response carried no data, using fallback", booking_id);
                diagnostics.push(format!("booking {booking_id}: empty response"));
                None
            }
            Err(e) => {
                warn!("Error fetching booking {} from API, using fallback: {}", booking_id, e);
                diagnostics.push(format!("booking {booking_id}: {e}"));
                None
            }
        }
    }

    /// Cache first, then backend. Cache corruption is not a backend failure
    /// and propagates.
    async fn resolve_cab(
        &self,
        cab_id: &str,
        diagnostics: &mut Vec<String>,
    ) -> Result<Option<CabType>> {
        let cache = CabTypeCache::new(self.store);
        if let Some(cab) = cache.find(cab_id)? {
            debug!("Cab type {} served from cache", cab_id);
            return Ok(Some(cab));
        }

        match self.backend.cab_type_by_id(cab_id).await {
            Ok(Some(mut cab)) => {
                if cab.id.as_deref().is_none_or(str::is_empty) {
                    cab.id = Some(cab_id.to_string());
                }
                cache.remember(&cab)?;
                Ok(Some(cab))
            }
            Ok(None) => Ok(None),
            Err(e) if e.is_backend_failure() => {
                warn!("Error fetching cab details for {}, using fallback: {}", cab_id, e);
                diagnostics.push(format!("cab type {cab_id}: {e}"));
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn synthesize_and_persist(
        &self,
        query: &BookingQuery,
        ctx: &ResolveContext,
        diagnostics: &mut Vec<String>,
    ) -> Result<BookingSummary> {
        let cab = match query.cab_id.as_deref() {
            Some(cab_id) => self.resolve_cab(cab_id, diagnostics).await?,
            None => None,
        };

        let synthesized = synthesize(query, ctx, cab.as_ref());
        write_json(self.store, LAST_BOOKING_KEY, &synthesized.snapshot)?;
        BookingHistory::new(self.store).insert(synthesized.history)?;

        Ok(synthesized.summary)
    }

    /// Remember a page load in the booking history. Failures are logged only.
    pub fn record_visit(&self, query: &BookingQuery, ctx: &ResolveContext) {
        let Some(entry) = visit_entry(query, ctx) else {
            return;
        };
        if let Err(e) = BookingHistory::new(self.store).insert(entry) {
            error!("Error saving booking to history: {}", e);
        }
    }
}
