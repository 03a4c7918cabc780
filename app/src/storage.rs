//! Persistent client-side key/value storage.
//!
//! In the browser this is `window.localStorage`; everything above the
//! [`KeyValueStore`] trait is target independent so the resolver and the
//! admin gate can be exercised against [`MemoryStore`].

use crate::error::{BookingError, Result};
use crate::types::{BookingHistoryEntry, BookingQuery, CabType, UserProfile};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::RwLock;

pub const ADMIN_AUTH_KEY: &str = "adminAuth";
pub const USER_BOOKINGS_KEY: &str = "userBookings";
pub const CAB_TYPES_KEY: &str = "cabTypes";
pub const LAST_BOOKING_KEY: &str = "lastBooking";
pub const USER_ID_KEY: &str = "userId";
pub const USER_EMAIL_KEY: &str = "userEmail";
pub const USER_MOBILE_KEY: &str = "userMobile";
pub const TOKEN_KEY: &str = "token";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str);
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key);
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.entries.write() {
            for (k, v) in entries {
                map.insert(k.to_string(), v.to_string());
            }
        }
        store
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .map_err(|e| BookingError::Storage(format!("store poisoned: {e}")))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        if let Ok(mut map) = self.entries.write() {
            map.remove(key);
        }
    }
}

/// `window.localStorage`. Off the browser this is an empty store that drops
/// writes, which is what server-side rendering needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStore;

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

impl KeyValueStore for BrowserStore {
    #[cfg(target_arch = "wasm32")]
    fn get(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    #[cfg(target_arch = "wasm32")]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        let storage = local_storage()
            .ok_or_else(|| BookingError::Storage("localStorage unavailable".to_string()))?;
        storage
            .set_item(key, value)
            .map_err(|e| BookingError::Storage(format!("{e:?}")))
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    fn remove(&self, key: &str) {
        let Some(storage) = local_storage() else {
            return;
        };
        if let Err(e) = storage.remove_item(key) {
            tracing::warn!("Could not remove {} from localStorage: {:?}", key, e);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn remove(&self, _key: &str) {}
}

// === Typed access ===

pub fn read_json<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.get(key) {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| BookingError::Storage(format!("{key}: {e}"))),
        None => Ok(None),
    }
}

pub fn write_json<T: Serialize>(store: &impl KeyValueStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// Ordered booking history, most recent first.
pub struct BookingHistory<'a, S: KeyValueStore> {
    store: &'a S,
}

impl<'a, S: KeyValueStore> BookingHistory<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn entries(&self) -> Result<Vec<BookingHistoryEntry>> {
        Ok(read_json(self.store, USER_BOOKINGS_KEY)?.unwrap_or_default())
    }

    /// Put `entry` at the front unless an entry with the same id exists.
    /// Returns whether the history changed.
    pub fn insert(&self, entry: BookingHistoryEntry) -> Result<bool> {
        let mut entries = self.entries()?;
        if entries.iter().any(|e| e.id == entry.id) {
            return Ok(false);
        }
        entries.insert(0, entry);
        write_json(self.store, USER_BOOKINGS_KEY, &entries)?;
        Ok(true)
    }
}

/// Read-through cache of cab types keyed by `_id`.
pub struct CabTypeCache<'a, S: KeyValueStore> {
    store: &'a S,
}

impl<'a, S: KeyValueStore> CabTypeCache<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn all(&self) -> Result<Vec<CabType>> {
        Ok(read_json(self.store, CAB_TYPES_KEY)?.unwrap_or_default())
    }

    pub fn find(&self, id: &str) -> Result<Option<CabType>> {
        Ok(self
            .all()?
            .into_iter()
            .find(|cab| cab.id.as_deref() == Some(id)))
    }

    pub fn remember(&self, cab: &CabType) -> Result<bool> {
        let mut cabs = self.all()?;
        if cabs.iter().any(|c| c.id == cab.id) {
            return Ok(false);
        }
        cabs.push(cab.clone());
        write_json(self.store, CAB_TYPES_KEY, &cabs)?;
        Ok(true)
    }
}

pub fn load_user_profile(store: &impl KeyValueStore, query: &BookingQuery) -> UserProfile {
    UserProfile {
        user_id: store
            .get(USER_ID_KEY)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "guest".to_string()),
        email: store
            .get(USER_EMAIL_KEY)
            .filter(|s| !s.is_empty())
            .or_else(|| query.email.clone())
            .unwrap_or_default(),
        mobile: store
            .get(USER_MOBILE_KEY)
            .filter(|s| !s.is_empty())
            .or_else(|| query.mobile.clone())
            .unwrap_or_default(),
        token: store.get(TOKEN_KEY).filter(|s| !s.is_empty()),
    }
}
