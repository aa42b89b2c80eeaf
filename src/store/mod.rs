//! Visitor-scoped key/value storage.
//!
//! DESIGN
//! ======
//! Pages keep small JSON blobs (the pending cart, the cached cart) per
//! visitor, the way a browser keeps them in local storage. The blobs sit
//! behind `KeyValueStore` so services can be handed an in-memory store, an
//! unavailable store, or anything else in tests.
//!
//! TRADE-OFFS
//! ==========
//! Each `get`/`set` is atomic on its own, but read-modify-write sequences are
//! not: two writers racing on the same key resolve as last write wins.

pub mod pending_cart;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::config::AppConfig;
pub use pending_cart::PendingCart;

/// Key of the pending (pre-login) cart blob.
pub const PENDING_CART_KEY: &str = "pendingCart";
/// Key of the idempotency key shared by every sync of the pending cart.
pub const PENDING_SYNC_KEY: &str = "pendingCartSyncKey";
/// Key of the locally cached cart view.
pub const CART_ITEMS_KEY: &str = "cartItems";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("stored value for {key} is not valid JSON: {reason}")]
    Corrupt { key: String, reason: String },
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Decode a JSON list stored under `key`; absent keys read as empty.
pub(crate) fn read_list<T: serde::de::DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Vec<T>, StorageError> {
    let Some(raw) = store.get(key)? else {
        return Ok(Vec::new());
    };
    serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt { key: key.to_owned(), reason: e.to_string() })
}

pub(crate) fn write_list<T: serde::Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    items: &[T],
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(items)
        .map_err(|e| StorageError::Corrupt { key: key.to_owned(), reason: e.to_string() })?;
    store.set(key, raw)
}

// =============================================================================
// MEMORY STORE
// =============================================================================

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// A store that is never reachable, like local storage during server render.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn set(&self, _key: &str, _value: String) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

// =============================================================================
// VISITOR REGISTRY
// =============================================================================

struct VisitorEntry {
    store: Arc<MemoryStore>,
    touched: Instant,
}

/// One `MemoryStore` per visitor id, created on first write.
///
/// Registering a new visitor sweeps entries idle for longer than `idle`;
/// at `capacity` the least recently touched visitor is dropped as well.
#[derive(Clone)]
pub struct VisitorStores {
    inner: Arc<Mutex<HashMap<Uuid, VisitorEntry>>>,
    idle: Duration,
    capacity: usize,
}

impl Default for VisitorStores {
    fn default() -> Self {
        let config = AppConfig::default();
        Self::with_limits(config.visitor_idle(), config.visitor_capacity)
    }
}

impl VisitorStores {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_limits(idle: Duration, capacity: usize) -> Self {
        Self { inner: Arc::default(), idle, capacity: capacity.max(1) }
    }

    /// Store of an already registered visitor. Unknown ids are not added.
    #[must_use]
    pub fn existing(&self, visitor: Uuid) -> Option<Arc<dyn KeyValueStore>> {
        let mut stores = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = stores.get_mut(&visitor)?;
        entry.touched = Instant::now();
        let store: Arc<dyn KeyValueStore> = entry.store.clone();
        Some(store)
    }

    /// Store of `visitor`, registering it when unknown.
    #[must_use]
    pub fn store_for(&self, visitor: Uuid) -> Arc<dyn KeyValueStore> {
        let now = Instant::now();
        let mut stores = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = stores.get_mut(&visitor) {
            entry.touched = now;
            return entry.store.clone();
        }

        self.evict(&mut stores, now);
        let store = Arc::new(MemoryStore::new());
        stores.insert(visitor, VisitorEntry { store: store.clone(), touched: now });
        store
    }

    fn evict(&self, stores: &mut HashMap<Uuid, VisitorEntry>, now: Instant) {
        let before = stores.len();
        stores.retain(|_, entry| now.duration_since(entry.touched) < self.idle);
        while stores.len() >= self.capacity {
            let Some(oldest) = stores
                .iter()
                .min_by_key(|(_, entry)| entry.touched)
                .map(|(id, _)| *id)
            else {
                break;
            };
            stores.remove(&oldest);
        }
        let evicted = before - stores.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = stores.len(), "evicted visitor stores");
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
