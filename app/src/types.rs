use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_CAB_NAME: &str = "Standard Cab";
pub const DEFAULT_AMOUNT: &str = "3000";
pub const DEFAULT_FROM: &str = "Origin City";
pub const DEFAULT_TO: &str = "Destination City";
pub const CURRENCY_SYMBOL: &str = "₹";

/// Query parameters understood by the booking confirmation page.
///
/// Every field is optional; empty values are normalised to `None` so that
/// fallbacks apply the same way to `?from=` and to a missing `from`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingQuery {
    pub booking_id: Option<String>,
    pub method: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub cab_name: Option<String>,
    pub amount: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub distance: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub travel_date: Option<String>,
    pub travel_time: Option<String>,
    pub payment_method: Option<String>,
    pub cab_id: Option<String>,
    pub booking_type: Option<String>,
}

impl BookingQuery {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let value: String = value.into();
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_ref() {
                "bookingId" => &mut query.booking_id,
                "method" => &mut query.method,
                "from" => &mut query.from,
                "to" => &mut query.to,
                "cabName" => &mut query.cab_name,
                "amount" => &mut query.amount,
                "date" => &mut query.date,
                "time" => &mut query.time,
                "distance" => &mut query.distance,
                "email" => &mut query.email,
                "mobile" => &mut query.mobile,
                "travelDate" => &mut query.travel_date,
                "travelTime" => &mut query.travel_time,
                "paymentMethod" => &mut query.payment_method,
                "cabId" => &mut query.cab_id,
                "type" => &mut query.booking_type,
                _ => continue,
            };
            *slot = Some(value);
        }
        query
    }

    pub fn payment_method(&self) -> PaymentMethod {
        PaymentMethod::from_param(self.method.as_deref())
    }

    /// Raw `method` parameter as recorded in the history list.
    pub fn method_or_default(&self) -> String {
        self.method.clone().unwrap_or_else(|| "online".to_string())
    }

    pub fn cab_name_or_default(&self) -> String {
        self.cab_name
            .clone()
            .unwrap_or_else(|| DEFAULT_CAB_NAME.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    Online,
    CashOnDelivery,
}

impl PaymentMethod {
    pub fn from_param(method: Option<&str>) -> Self {
        match method {
            Some(m) if m.eq_ignore_ascii_case("cod") => Self::CashOnDelivery,
            _ => Self::Online,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Online => "Online Payment",
            Self::CashOnDelivery => "Cash on Delivery",
        }
    }

    /// Payment status carried to the booking details page.
    pub fn redirect_status(self) -> &'static str {
        match self {
            Self::Online => "success",
            Self::CashOnDelivery => "pending",
        }
    }
}

/// Which page variant is rendering the booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// `/booking/confirmation`: everything comes from the query string.
    Confirmation,
    Lookup,
}

impl ViewKind {
    pub fn from_path(path: &str) -> Self {
        if path.contains("/booking/confirmation") {
            Self::Confirmation
        } else {
            Self::Lookup
        }
    }
}

/// Display-ready booking record. Every field is populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    pub id: String,
    pub date: String,
    pub time: String,
    pub from: String,
    pub to: String,
    pub cab_type: String,
    pub price: String,
    pub payment_method: String,
    pub travel_date: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
}

/// Booking as returned by `GET /booking/{id}`; any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub from_city: Option<String>,
    #[serde(default)]
    pub to_city: Option<String>,
    #[serde(default)]
    pub cab_type: Option<Value>,
    #[serde(default)]
    pub fare: Option<Value>,
    #[serde(default)]
    pub total_amount: Option<Value>,
    #[serde(default)]
    pub pickup_date: Option<String>,
    #[serde(default)]
    pub travel_date: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_mobile: Option<String>,
}

impl BookingRecord {
    /// Cab type may arrive as a plain name or as a populated cab object.
    pub fn cab_type_name(&self) -> Option<String> {
        match self.cab_type.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Object(map) => map
                .get("name")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            _ => None,
        }
    }
}

/// Cab type as returned by `GET /cab/type/{id}` and stored in the cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CabType {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_price: Option<Value>,
}

/// `{ "data": ... }` wrapper used by every backend response.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMarker {
    pub is_admin: bool,
    pub email: String,
    pub name: String,
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingHistoryEntry {
    pub id: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: String,
    pub cab_name: String,
    pub amount: String,
    pub status: String,
    pub payment_method: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastBookingSnapshot {
    pub booking_id: String,
    pub from_city: Option<String>,
    pub to_city: Option<String>,
    pub cab_type: String,
    pub cab_name: String,
    pub amount: String,
    pub payment_method: String,
    pub travel_date: String,
    pub travel_time: String,
    pub status: String,
    pub email: String,
    pub mobile: String,
    #[serde(rename = "_id")]
    pub id: String,
}

/// Persisted identity of the visitor, with query-string fallbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    pub mobile: String,
    pub token: Option<String>,
}

// === Display helpers ===

pub fn format_price(amount: &str) -> String {
    format!("{CURRENCY_SYMBOL}{amount}")
}

pub fn format_date(at: NaiveDateTime) -> String {
    at.format("%-m/%-d/%Y").to_string()
}

pub fn format_time(at: NaiveDateTime) -> String {
    at.format("%I:%M %p").to_string()
}

pub fn format_iso(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
}

/// Text of a JSON amount, treating `0`, `""` and `null` as absent.
pub fn amount_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => {
            if n.as_f64() == Some(0.0) {
                None
            } else {
                Some(n.to_string())
            }
        }
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Parse a date as sent by the booking form or the backend.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Apply an `HH:MM` pickup time to a date, keeping the date when unparsable.
pub fn apply_time(date: NaiveDateTime, raw: &str) -> NaiveDateTime {
    let Some(time) = NaiveTime::parse_from_str(raw, "%H:%M").ok() else {
        return date;
    };
    date.with_hour(time.hour())
        .and_then(|d| d.with_minute(time.minute()))
        .unwrap_or(date)
}
