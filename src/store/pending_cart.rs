//! Pending cart — purchases queued by an anonymous visitor.
//!
//! The whole list is one serialized blob under [`PENDING_CART_KEY`]. `add`
//! appends without merging, so adding the same tour twice yields two lines.
//!
//! Next to the list sits the idempotency key its submissions carry. It is
//! created with the first write and lives until `clear`, so a replay after a
//! lost acknowledgement reaches the backend under the same key.

use uuid::Uuid;

use super::{KeyValueStore, PENDING_CART_KEY, PENDING_SYNC_KEY, StorageError, read_list, write_list};
use crate::models::PendingCartItem;

pub struct PendingCart<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> PendingCart<'a> {
    #[must_use]
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Overwrite the stored list.
    pub fn save(&self, items: &[PendingCartItem]) -> Result<(), StorageError> {
        write_list(self.store, PENDING_CART_KEY, items)?;
        self.sync_key().map(drop)
    }

    /// Idempotency key for submitting the stored list, created when missing.
    pub fn sync_key(&self) -> Result<String, StorageError> {
        if let Some(key) = self.store.get(PENDING_SYNC_KEY)? {
            return Ok(key);
        }
        let key = Uuid::new_v4().to_string();
        self.store.set(PENDING_SYNC_KEY, key.clone())?;
        Ok(key)
    }

    /// Stored items, or an empty list when nothing is stored, the store is
    /// unavailable, or the blob cannot be decoded.
    #[must_use]
    pub fn get(&self) -> Vec<PendingCartItem> {
        match read_list(self.store, PENDING_CART_KEY) {
            Ok(items) => items,
            Err(StorageError::Unavailable) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable pending cart");
                Vec::new()
            }
        }
    }

    pub fn add(&self, item: PendingCartItem) -> Result<(), StorageError> {
        let mut items = self.get();
        items.push(item);
        self.save(&items)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(PENDING_CART_KEY)?;
        self.store.remove(PENDING_SYNC_KEY)
    }
}

#[cfg(test)]
#[path = "pending_cart_test.rs"]
mod tests;
