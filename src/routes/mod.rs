//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the storefront's JSON API and the two post-login sync
//! pages under a single Axum router. Pages are redirects: they do their work
//! server-side and send the browser on to the next screen.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod maps;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::models::{Tour, TransportOption};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/auth/sync-cart", get(cart::oauth_sync))
        .route("/login/sync-cart", get(cart::login_sync))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/sync-cart", post(cart::sync_cart))
        .route(
            "/api/pending-cart",
            get(cart::get_pending)
                .post(cart::add_pending)
                .put(cart::save_pending)
                .delete(cart::clear_pending),
        )
        .route("/api/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route("/api/cart/items", post(cart::add_cart_item))
        .route("/api/cart/items/{id}", axum::routing::delete(cart::remove_cart_item))
        .route("/api/static-map", post(maps::static_map))
        .route("/api/tours", get(catalog::list::<Tour>).post(catalog::create::<Tour>))
        .route("/api/tours/featured", get(catalog::featured::<Tour>))
        .route("/api/tours/slug/{slug}", get(catalog::get_by_slug::<Tour>))
        .route(
            "/api/tours/{id}",
            get(catalog::get_one::<Tour>)
                .put(catalog::update::<Tour>)
                .delete(catalog::delete::<Tour>),
        )
        .route(
            "/api/transport",
            get(catalog::list::<TransportOption>).post(catalog::create::<TransportOption>),
        )
        .route("/api/transport/featured", get(catalog::featured::<TransportOption>))
        .route("/api/transport/slug/{slug}", get(catalog::get_by_slug::<TransportOption>))
        .route(
            "/api/transport/{id}",
            get(catalog::get_one::<TransportOption>)
                .put(catalog::update::<TransportOption>)
                .delete(catalog::delete::<TransportOption>),
        )
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
