//! Integration tests for the booking resolver chain
//!
//! Runs `BookingResolver` against an in-memory store and a scripted backend.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::doc_markdown
)]

use app::backend::BookingBackend;
use app::error::{BookingError, Result};
use app::resolver::{BookingResolver, ResolutionSource, ResolveContext};
use app::storage::{
    BookingHistory, CAB_TYPES_KEY, KeyValueStore, LAST_BOOKING_KEY, MemoryStore, load_user_profile,
};
use app::types::{BookingQuery, BookingRecord, CabType, LastBookingSnapshot, ViewKind};
use chrono::NaiveDate;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Copy)]
enum Reply {
    Found,
    /// Found, but the payload carries no `_id`.
    Unlabelled,
    Empty,
    Down,
}

struct ScriptedBackend {
    booking: Reply,
    cab: Reply,
    booking_calls: AtomicUsize,
    cab_calls: AtomicUsize,
}

impl ScriptedBackend {
    fn new(booking: Reply, cab: Reply) -> Self {
        Self {
            booking,
            cab,
            booking_calls: AtomicUsize::new(0),
            cab_calls: AtomicUsize::new(0),
        }
    }

    fn booking_calls(&self) -> usize {
        self.booking_calls.load(Ordering::SeqCst)
    }

    fn cab_calls(&self) -> usize {
        self.cab_calls.load(Ordering::SeqCst)
    }
}

impl BookingBackend for ScriptedBackend {
    async fn booking_by_id(&self, id: &str, _token: Option<&str>) -> Result<Option<BookingRecord>> {
        self.booking_calls.fetch_add(1, Ordering::SeqCst);
        match self.booking {
            Reply::Found => Ok(Some(
                serde_json::from_value(json!({
                    "_id": id,
                    "fromCity": "Pune",
                    "toCity": "Mumbai",
                    "cabType": { "name": "Prime SUV" },
                    "fare": 2450,
                    "pickupDate": "2025-07-04T09:00:00.000Z",
                    "customerEmail": "backend@example.com"
                }))
                .unwrap(),
            )),
            Reply::Empty | Reply::Unlabelled => Ok(None),
            Reply::Down => Err(BookingError::BackendUnavailable("connection refused".into())),
        }
    }

    async fn cab_type_by_id(&self, id: &str) -> Result<Option<CabType>> {
        self.cab_calls.fetch_add(1, Ordering::SeqCst);
        match self.cab {
            Reply::Found => Ok(Some(CabType {
                id: Some(id.to_string()),
                name: Some("Mini".to_string()),
                base_price: Some(json!(999)),
            })),
            Reply::Unlabelled => Ok(Some(CabType {
                id: None,
                name: Some("Auto".to_string()),
                base_price: None,
            })),
            Reply::Empty => Ok(None),
            Reply::Down => Err(BookingError::NotFound(format!("/cab/type/{id}"))),
        }
    }
}

fn context(view: ViewKind, store: &MemoryStore, query: &BookingQuery) -> ResolveContext {
    ResolveContext {
        view,
        now: NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap(),
        suffix: 7,
        user: load_user_profile(store, query),
    }
}

#[tokio::test]
async fn test_confirmation_view_uses_query_without_backend() {
    let store = MemoryStore::new();
    let backend = ScriptedBackend::new(Reply::Found, Reply::Found);
    let query = BookingQuery::from_pairs([
        ("bookingId", "BK123"),
        ("from", "CityA"),
        ("to", "CityB"),
        ("amount", "1500"),
        ("method", "online"),
    ]);
    let ctx = context(ViewKind::Confirmation, &store, &query);
    let resolver = BookingResolver::new(&backend, &store);

    resolver.record_visit(&query, &ctx);
    let resolved = resolver.resolve(&query, &ctx).await;

    assert_eq!(resolved.source, ResolutionSource::DirectParams);
    assert_eq!(resolved.summary.id, "BK123");
    assert_eq!(resolved.summary.from, "CityA");
    assert_eq!(resolved.summary.to, "CityB");
    assert_eq!(resolved.summary.price, "₹1500");
    assert_eq!(resolved.summary.cab_type, "Standard Cab");
    assert_eq!(resolved.summary.payment_method, "Online Payment");
    assert!(!resolved.email_sent);
    assert_eq!(backend.booking_calls(), 0);

    let history = BookingHistory::new(&store).entries().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, "BK123");
}

#[tokio::test]
async fn test_lookup_view_prefers_backend_record() {
    let store = MemoryStore::new();
    let backend = ScriptedBackend::new(Reply::Found, Reply::Found);
    let query = BookingQuery::from_pairs([("bookingId", "66a1"), ("method", "cod")]);
    let ctx = context(ViewKind::Lookup, &store, &query);

    let resolved = BookingResolver::new(&backend, &store)
        .resolve(&query, &ctx)
        .await;

    assert_eq!(resolved.source, ResolutionSource::Backend);
    assert_eq!(resolved.summary.id, "66a1");
    assert_eq!(resolved.summary.from, "Pune");
    assert_eq!(resolved.summary.cab_type, "Prime SUV");
    assert_eq!(resolved.summary.price, "₹2450");
    assert_eq!(resolved.summary.travel_date, "7/4/2025");
    assert_eq!(resolved.summary.email, "backend@example.com");
    assert_eq!(resolved.summary.payment_method, "Cash on Delivery");
    assert_eq!(backend.booking_calls(), 1);
    assert!(store.get(LAST_BOOKING_KEY).is_none());
}

#[tokio::test]
async fn test_backend_failure_falls_through_to_synthesis() {
    let store = MemoryStore::with_entries([("userEmail", "rider@example.com")]);
    let backend = ScriptedBackend::new(Reply::Down, Reply::Empty);
    let query = BookingQuery::from_pairs([
        ("bookingId", "66a1"),
        ("from", "Delhi"),
        ("to", "Agra"),
        ("amount", "1800"),
        ("travelDate", "2025-08-15"),
        ("travelTime", "06:45"),
    ]);
    let ctx = context(ViewKind::Lookup, &store, &query);

    let resolved = BookingResolver::new(&backend, &store)
        .resolve(&query, &ctx)
        .await;

    assert_eq!(resolved.source, ResolutionSource::Synthesized);
    assert_eq!(resolved.summary.id, "BK7");
    assert_eq!(resolved.summary.price, "₹1800");
    assert_eq!(resolved.summary.travel_date, "8/15/2025");
    assert!(resolved.email_sent);
    assert_eq!(resolved.diagnostics.len(), 1);

    let snapshot: LastBookingSnapshot =
        serde_json::from_str(&store.get(LAST_BOOKING_KEY).unwrap()).unwrap();
    assert_eq!(snapshot.booking_id, "BK7");
    assert_eq!(snapshot.travel_time, "06:45 AM");
    assert_eq!(snapshot.status, "confirmed");

    let history = BookingHistory::new(&store).entries().unwrap();
    assert_eq!(history[0].id, "BK7");
}

#[tokio::test]
async fn test_empty_envelope_falls_through() {
    let store = MemoryStore::new();
    let backend = ScriptedBackend::new(Reply::Empty, Reply::Empty);
    let query = BookingQuery::from_pairs([("bookingId", "66a1")]);
    let ctx = context(ViewKind::Lookup, &store, &query);

    let resolved = BookingResolver::new(&backend, &store)
        .resolve(&query, &ctx)
        .await;

    assert_eq!(resolved.source, ResolutionSource::Synthesized);
    assert_eq!(resolved.summary.from, "Origin City");
    assert_eq!(resolved.summary.to, "Destination City");
    assert!(!resolved.email_sent);
}

#[tokio::test]
async fn test_confirmation_like_id_is_never_fetched() {
    let store = MemoryStore::new();
    let backend = ScriptedBackend::new(Reply::Found, Reply::Empty);
    let query = BookingQuery::from_pairs([("bookingId", "booking-confirmation")]);
    let ctx = context(ViewKind::Lookup, &store, &query);

    let resolved = BookingResolver::new(&backend, &store)
        .resolve(&query, &ctx)
        .await;

    assert_eq!(resolved.source, ResolutionSource::Synthesized);
    assert_eq!(backend.booking_calls(), 0);
}

#[tokio::test]
async fn test_cab_type_is_cached_after_first_fetch() {
    let store = MemoryStore::new();
    let backend = ScriptedBackend::new(Reply::Empty, Reply::Found);
    let query = BookingQuery::from_pairs([("from", "A"), ("to", "B"), ("cabId", "cab-1")]);
    let resolver = BookingResolver::new(&backend, &store);

    let first = resolver
        .resolve(&query, &context(ViewKind::Lookup, &store, &query))
        .await;
    let second = resolver
        .resolve(&query, &context(ViewKind::Lookup, &store, &query))
        .await;

    assert_eq!(first.summary.cab_type, "Mini");
    assert_eq!(first.summary.price, "₹999");
    assert_eq!(second.summary.cab_type, "Mini");
    assert_eq!(backend.cab_calls(), 1);

    let cached: Vec<CabType> = serde_json::from_str(&store.get(CAB_TYPES_KEY).unwrap()).unwrap();
    assert_eq!(cached.len(), 1);
}

#[tokio::test]
async fn test_cab_fetch_failure_uses_query_cab_name() {
    let store = MemoryStore::new();
    let backend = ScriptedBackend::new(Reply::Empty, Reply::Down);
    let query = BookingQuery::from_pairs([
        ("from", "A"),
        ("to", "B"),
        ("cabId", "cab-9"),
        ("cabName", "Sedan"),
    ]);
    let ctx = context(ViewKind::Lookup, &store, &query);

    let resolved = BookingResolver::new(&backend, &store)
        .resolve(&query, &ctx)
        .await;

    assert_eq!(resolved.source, ResolutionSource::Synthesized);
    assert_eq!(resolved.summary.cab_type, "Sedan");
    assert_eq!(resolved.summary.price, "₹3000");
    assert!(store.get(CAB_TYPES_KEY).is_none());
}

#[tokio::test]
async fn test_corrupt_cache_yields_minimal_summary() {
    let store = MemoryStore::with_entries([
        (CAB_TYPES_KEY, "{not json"),
        ("userEmail", "rider@example.com"),
    ]);
    let backend = ScriptedBackend::new(Reply::Empty, Reply::Found);
    let query = BookingQuery::from_pairs([("from", "A"), ("to", "B"), ("cabId", "cab-1")]);
    let ctx = context(ViewKind::Lookup, &store, &query);

    let resolved = BookingResolver::new(&backend, &store)
        .resolve(&query, &ctx)
        .await;

    assert_eq!(resolved.source, ResolutionSource::Minimal);
    assert_eq!(resolved.summary.id, "BK7");
    assert_eq!(resolved.summary.from, "A");
    assert_eq!(resolved.summary.cab_type, "Standard Cab");
    assert_eq!(resolved.summary.price, "₹3000");
    assert_eq!(resolved.summary.payment_method, "Online Payment");
    assert_eq!(resolved.summary.email, "rider@example.com");
    assert!(!resolved.email_sent);
    assert_eq!(backend.cab_calls(), 0);
    assert!(!resolved.diagnostics.is_empty());
}

#[tokio::test]
async fn test_cab_without_id_is_cached_under_requested_id() {
    let store = MemoryStore::new();
    let backend = ScriptedBackend::new(Reply::Empty, Reply::Unlabelled);
    let resolver = BookingResolver::new(&backend, &store);

    for cab_id in ["cab-1", "cab-1", "cab-2"] {
        let query = BookingQuery::from_pairs([("from", "A"), ("to", "B"), ("cabId", cab_id)]);
        let resolved = resolver
            .resolve(&query, &context(ViewKind::Lookup, &store, &query))
            .await;
        assert_eq!(resolved.summary.cab_type, "Auto");
    }

    assert_eq!(backend.cab_calls(), 2);
    let cached: Vec<CabType> = serde_json::from_str(&store.get(CAB_TYPES_KEY).unwrap()).unwrap();
    let ids: Vec<_> = cached.iter().map(|c| c.id.as_deref()).collect();
    assert_eq!(ids, vec![Some("cab-1"), Some("cab-2")]);
}
