//! Cart state — the cart view a visitor sees.
//!
//! DESIGN
//! ======
//! The cached items under [`CART_ITEMS_KEY`] give an immediate view. With a
//! session token the backend cart is fetched and, when it answers, replaces
//! the cache wholesale. Local edits (`add_item`, `remove_item`, `clear_cart`)
//! only touch the cache; the backend wins again on the next `load`.

use serde::Serialize;

use crate::backend::CartApi;
use crate::models::{CartItem, Lang, round_cents};
use crate::store::{CART_ITEMS_KEY, KeyValueStore, StorageError, read_list, write_list};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CartSource {
    Local,
    Backend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub source: CartSource,
    pub total: f64,
}

impl CartView {
    pub(crate) fn new(items: Vec<CartItem>, source: CartSource) -> Self {
        let total = items_total(&items);
        Self { items, source, total }
    }
}

pub struct CartState<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> CartState<'a> {
    #[must_use]
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Cached items; an unreadable cache reads as empty.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        match read_list(self.store, CART_ITEMS_KEY) {
            Ok(items) => items,
            Err(StorageError::Unavailable) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable cart cache");
                Vec::new()
            }
        }
    }

    /// Current cart view, refreshed from the backend when a token is present.
    pub async fn load(&self, cart_api: &dyn CartApi, token: Option<&str>, lang: Lang) -> CartView {
        let local = self.items();
        let Some(token) = token else {
            return CartView::new(local, CartSource::Local);
        };

        match cart_api.get_cart(token).await {
            Ok(cart) => {
                let items: Vec<CartItem> = cart
                    .items
                    .into_iter()
                    .map(|item| item.into_cart_item(lang))
                    .collect();
                if let Err(e) = write_list(self.store, CART_ITEMS_KEY, &items) {
                    tracing::warn!(error = %e, "could not cache backend cart");
                }
                CartView::new(items, CartSource::Backend)
            }
            Err(e) if e.is_unauthorized() => {
                tracing::debug!("session rejected by backend, serving cached cart");
                CartView::new(local, CartSource::Local)
            }
            Err(e) => {
                tracing::warn!(error = %e, "backend cart unavailable, serving cached cart");
                CartView::new(local, CartSource::Local)
            }
        }
    }

    /// Merge `item` into the cart: an existing line with the same id grows by
    /// the incoming quantity, otherwise the item is appended.
    pub fn add_item(&self, mut item: CartItem) -> Result<Vec<CartItem>, StorageError> {
        let mut items = self.items();
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
                existing.recompute_total();
            }
            None => {
                item.recompute_total();
                items.push(item);
            }
        }
        write_list(self.store, CART_ITEMS_KEY, &items)?;
        Ok(items)
    }

    pub fn remove_item(&self, id: &str) -> Result<Vec<CartItem>, StorageError> {
        let mut items = self.items();
        items.retain(|item| item.id != id);
        write_list(self.store, CART_ITEMS_KEY, &items)?;
        Ok(items)
    }

    pub fn clear_cart(&self) -> Result<(), StorageError> {
        self.store.remove(CART_ITEMS_KEY)
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        items_total(&self.items())
    }
}

fn items_total(items: &[CartItem]) -> f64 {
    round_cents(items.iter().map(|item| item.total).sum())
}

#[cfg(test)]
#[path = "cart_test.rs"]
mod tests;
