//! Wire and domain types.
//!
//! DESIGN
//! ======
//! Every type here is shared by the route layer, the services and the
//! backend client, so all of them serialize with camelCase field names to
//! match what the browser and the booking backend exchange.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod geo;
pub mod i18n;

pub use cart::{BackendCart, CartItem, CreateCartRequest, PendingCartItem, ProductType};
pub use catalog::{CatalogEntity, FeaturedSummary, Tour, TransportOption};
pub use geo::GeoPoint;
pub use i18n::{Lang, LocalizedText};

/// Round a currency amount to whole cents.
#[must_use]
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
