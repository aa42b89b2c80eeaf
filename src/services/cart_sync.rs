//! Pending-cart handoff after login.
//!
//! ARCHITECTURE
//! ============
//! Anonymous visitors queue items in the pending cart. Once a session token
//! exists, the queued items are submitted to the backend in a single
//! request carrying the pending cart's idempotency key. The key survives
//! failed attempts, so the backend can drop a replay of a cart it already
//! committed.
//!
//! TRADE-OFFS
//! ==========
//! The pending cart is cleared only after the backend acknowledges the
//! submission. A failed sync leaves the queue intact so the next login can
//! replay it; callers still move the visitor forward instead of blocking.

use uuid::Uuid;

use crate::backend::{BackendError, CartApi};
use crate::models::cart::CartLine;
use crate::models::{BackendCart, CreateCartRequest, PendingCartItem, round_cents};
use crate::store::{KeyValueStore, PendingCart};

/// Backend acknowledgement of a submitted cart.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReceipt {
    pub synced: usize,
    pub total_price: f64,
    pub cart: BackendCart,
}

#[derive(Debug)]
pub enum SyncOutcome {
    NothingToSync,
    Synced(SyncReceipt),
    Failed(BackendError),
}

impl SyncOutcome {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::NothingToSync => "nothing_to_sync",
            Self::Synced(_) => "synced",
            Self::Failed(_) => "failed",
        }
    }
}

/// Sum of item totals, filling in totals the client left out.
#[must_use]
pub fn cart_total(items: &[PendingCartItem]) -> f64 {
    round_cents(items.iter().map(|item| CartLine::from(item).total).sum())
}

/// Submit `items` to the backend cart in one request.
///
/// # Errors
///
/// Returns the backend error unchanged; nothing is retried.
pub async fn submit_items(
    cart_api: &dyn CartApi,
    token: &str,
    items: &[PendingCartItem],
    total_override: Option<f64>,
    idempotency_key: &str,
) -> Result<SyncReceipt, BackendError> {
    let total_price = total_override.map_or_else(|| cart_total(items), round_cents);
    let request = CreateCartRequest { items: items.iter().map(CartLine::from).collect(), total_price };

    let cart = cart_api
        .create_cart(token, idempotency_key, &request)
        .await?;
    Ok(SyncReceipt { synced: items.len(), total_price, cart })
}

/// Replay the visitor's pending cart against the backend.
pub async fn sync_pending_cart(
    cart_api: &dyn CartApi,
    store: &dyn KeyValueStore,
    token: &str,
    total_override: Option<f64>,
) -> SyncOutcome {
    let pending = PendingCart::new(store);
    let items = pending.get();
    if items.is_empty() {
        return SyncOutcome::NothingToSync;
    }

    let idempotency_key = match pending.sync_key() {
        Ok(key) => key,
        Err(e) => {
            tracing::warn!(error = %e, "pending cart sync key unavailable, using a one-off key");
            Uuid::new_v4().to_string()
        }
    };

    match submit_items(cart_api, token, &items, total_override, &idempotency_key).await {
        Ok(receipt) => {
            if let Err(e) = pending.clear() {
                tracing::warn!(error = %e, "synced cart but could not clear pending items");
            }
            tracing::info!(synced = receipt.synced, total = receipt.total_price, "pending cart synced");
            SyncOutcome::Synced(receipt)
        }
        Err(e) => {
            tracing::warn!(items = items.len(), error = %e, "pending cart sync failed, keeping items");
            SyncOutcome::Failed(e)
        }
    }
}

#[cfg(test)]
#[path = "cart_sync_test.rs"]
mod tests;
