//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the storefront logic (cart view, pending-cart
//! handoff, catalog fallback, static map URLs) so route handlers can stay
//! focused on request parsing, cookies and status codes.

pub mod cart;
pub mod cart_sync;
pub mod catalog;
pub mod mock_catalog;
pub mod static_map;
