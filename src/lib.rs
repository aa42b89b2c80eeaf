//! Backend-for-frontend for the travel agency storefront.
//!
//! Browsers talk to this service; it talks to the booking backend (auth,
//! catalogs, cart) and to the static map provider. See `routes` for the
//! served endpoints.

pub mod backend;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
