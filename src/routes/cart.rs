//! Cart routes — post-login sync pages, the sync API, pending cart and cart
//! state endpoints.
//!
//! Sync pages never block the visitor: whatever the sync outcome, they
//! redirect forward to the requested page or checkout. Only a missing
//! session sends the visitor to login first.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use reqwest::Url;
use serde::Deserialize;
use uuid::Uuid;

use super::auth::{MaybeSessionToken, known_visitor, session_cookie, visitor_id};
use crate::backend::client::IDEMPOTENCY_HEADER;
use crate::models::{CartItem, Lang, PendingCartItem};
use crate::services::cart::{CartSource, CartState, CartView};
use crate::services::cart_sync;
use crate::state::AppState;
use crate::store::{KeyValueStore, MemoryStore, PendingCart, StorageError};

const LOGIN_PATH: &str = "/login";
const LOGIN_URL_BASE: &str = "http://localhost/login";

// =============================================================================
// REDIRECTS
// =============================================================================

/// `target` when it is a local absolute path, else `fallback`.
///
/// Browsers drop tabs and newlines while parsing a `Location`, so any
/// whitespace or control character inside the path rejects it.
pub(crate) fn safe_redirect(target: Option<&str>, fallback: &str) -> String {
    match target.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(|c| c.is_control() || c.is_whitespace()) =>
        {
            path.to_owned()
        }
        _ => fallback.to_owned(),
    }
}

/// `/login?redirect=<target>`, with `target` query-encoded.
pub(crate) fn login_location(target: &str) -> String {
    let Ok(mut url) = Url::parse(LOGIN_URL_BASE) else {
        return LOGIN_PATH.to_owned();
    };
    url.query_pairs_mut().append_pair("redirect", target);
    match url.query() {
        Some(query) => format!("{LOGIN_PATH}?{query}"),
        None => LOGIN_PATH.to_owned(),
    }
}

/// Store for writes; mints the visitor cookie and registers the visitor.
fn visitor_store(state: &AppState, jar: CookieJar) -> (CookieJar, Arc<dyn KeyValueStore>) {
    let (jar, visitor) = visitor_id(jar, state.config.cookie_secure);
    (jar, state.visitors.store_for(visitor))
}

/// Store for reads; unknown visitors get a throwaway empty store.
fn known_store(state: &AppState, jar: &CookieJar) -> Arc<dyn KeyValueStore> {
    match known_visitor(jar).and_then(|visitor| state.visitors.existing(visitor)) {
        Some(store) => store,
        None => Arc::new(MemoryStore::new()),
    }
}

async fn sync_and_redirect(state: &AppState, jar: CookieJar, token: &str, target: &str, entry: &'static str) -> Response {
    let store = known_store(state, &jar);
    let outcome = cart_sync::sync_pending_cart(state.cart_api.as_ref(), store.as_ref(), token, None).await;
    tracing::info!(entry, outcome = outcome.label(), %target, "cart sync page");
    (jar, Redirect::to(target)).into_response()
}

// =============================================================================
// SYNC PAGES
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct OAuthSyncQuery {
    token: Option<String>,
    redirect: Option<String>,
}

/// `GET /auth/sync-cart` — landing page after a third-party login redirect.
pub async fn oauth_sync(State(state): State<AppState>, jar: CookieJar, Query(query): Query<OAuthSyncQuery>) -> Response {
    let target = safe_redirect(query.redirect.as_deref(), &state.config.checkout_path);
    let Some(token) = query.token.filter(|t| !t.trim().is_empty()) else {
        return Redirect::to(&login_location(&target)).into_response();
    };

    let jar = jar.add(session_cookie(token.clone(), false, state.config.cookie_secure));
    sync_and_redirect(&state, jar, &token, &target, "oauth").await
}

#[derive(Debug, Default, Deserialize)]
pub struct RedirectQuery {
    redirect: Option<String>,
}

/// `GET /login/sync-cart` — landing page after password login.
pub async fn login_sync(
    State(state): State<AppState>,
    jar: CookieJar,
    MaybeSessionToken(token): MaybeSessionToken,
    Query(query): Query<RedirectQuery>,
) -> Response {
    let target = safe_redirect(query.redirect.as_deref(), &state.config.checkout_path);
    let Some(token) = token else {
        return Redirect::to(&login_location(&target)).into_response();
    };
    sync_and_redirect(&state, jar, &token, &target, "login").await
}

// =============================================================================
// SYNC API
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCartBody {
    #[serde(default)]
    items: Vec<PendingCartItem>,
    #[serde(default)]
    total_price: Option<f64>,
}

fn sync_failure(status: StatusCode, error: &str, details: Option<String>) -> Response {
    let mut body = serde_json::json!({ "success": false, "error": error });
    if let Some(details) = details {
        body["details"] = serde_json::Value::String(details);
    }
    (status, Json(body)).into_response()
}

/// `POST /api/sync-cart` — submit the posted items to the backend cart.
pub async fn sync_cart(
    State(state): State<AppState>,
    MaybeSessionToken(token): MaybeSessionToken,
    headers: HeaderMap,
    payload: Result<Json<SyncCartBody>, JsonRejection>,
) -> Response {
    let Some(token) = token else {
        return sync_failure(StatusCode::UNAUTHORIZED, "Authentication required", None);
    };
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            return sync_failure(StatusCode::BAD_REQUEST, "Invalid request body", Some(rejection.body_text()));
        }
    };

    if body.items.is_empty() {
        return Json(serde_json::json!({ "success": true, "synced": 0 })).into_response();
    }
    if let Some(reason) = body.items.iter().find_map(|item| item.validate().err()) {
        return sync_failure(StatusCode::BAD_REQUEST, "Invalid cart item", Some(reason.to_owned()));
    }

    let idempotency_key = headers
        .get(IDEMPOTENCY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);

    let items: Vec<PendingCartItem> = body.items.into_iter().map(PendingCartItem::with_total).collect();
    match cart_sync::submit_items(state.cart_api.as_ref(), &token, &items, body.total_price, &idempotency_key).await {
        Ok(receipt) => Json(serde_json::json!({
            "success": true,
            "synced": receipt.synced,
            "data": receipt.cart,
        }))
        .into_response(),
        Err(e) => {
            tracing::warn!(items = items.len(), error = %e, "sync-cart request failed");
            let status = if e.is_unauthorized() { StatusCode::UNAUTHORIZED } else { StatusCode::BAD_GATEWAY };
            sync_failure(status, "Failed to sync cart", Some(e.details()))
        }
    }
}

// =============================================================================
// PENDING CART
// =============================================================================

pub(crate) fn storage_error_to_status(err: &StorageError) -> StatusCode {
    tracing::error!(error = %err, "visitor storage failed");
    match err {
        StorageError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        StorageError::Corrupt { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn invalid_item(reason: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": reason }))).into_response()
}

/// `GET /api/pending-cart`
pub async fn get_pending(State(state): State<AppState>, jar: CookieJar) -> Json<Vec<PendingCartItem>> {
    let store = known_store(&state, &jar);
    Json(PendingCart::new(store.as_ref()).get())
}

/// `POST /api/pending-cart` — append one item.
pub async fn add_pending(State(state): State<AppState>, jar: CookieJar, Json(item): Json<PendingCartItem>) -> Response {
    if let Err(reason) = item.validate() {
        return invalid_item(reason);
    }
    let (jar, store) = visitor_store(&state, jar);
    let pending = PendingCart::new(store.as_ref());
    if let Err(e) = pending.add(item.with_total()) {
        return storage_error_to_status(&e).into_response();
    }
    (StatusCode::CREATED, jar, Json(pending.get())).into_response()
}

/// `PUT /api/pending-cart` — overwrite the whole list.
pub async fn save_pending(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(items): Json<Vec<PendingCartItem>>,
) -> Response {
    if let Some(reason) = items.iter().find_map(|item| item.validate().err()) {
        return invalid_item(reason);
    }
    let items: Vec<PendingCartItem> = items.into_iter().map(PendingCartItem::with_total).collect();
    let (jar, store) = visitor_store(&state, jar);
    match PendingCart::new(store.as_ref()).save(&items) {
        Ok(()) => (jar, Json(items)).into_response(),
        Err(e) => storage_error_to_status(&e).into_response(),
    }
}

/// `DELETE /api/pending-cart`
pub async fn clear_pending(State(state): State<AppState>, jar: CookieJar) -> Response {
    let store = known_store(&state, &jar);
    match PendingCart::new(store.as_ref()).clear() {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => storage_error_to_status(&e).into_response(),
    }
}

// =============================================================================
// CART STATE
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    lang: Option<String>,
}

/// `GET /api/cart` — cached cart, refreshed from the backend with a session.
pub async fn get_cart(
    State(state): State<AppState>,
    jar: CookieJar,
    MaybeSessionToken(token): MaybeSessionToken,
    Query(query): Query<LangQuery>,
) -> Json<CartView> {
    let lang = Lang::from_query(query.lang.as_deref());
    let store = known_store(&state, &jar);
    let view = CartState::new(store.as_ref())
        .load(state.cart_api.as_ref(), token.as_deref(), lang)
        .await;
    Json(view)
}

/// `POST /api/cart/items`
pub async fn add_cart_item(State(state): State<AppState>, jar: CookieJar, Json(item): Json<CartItem>) -> Response {
    if item.id.trim().is_empty() {
        return invalid_item("id is required");
    }
    if item.quantity == 0 {
        return invalid_item("quantity must be at least 1");
    }
    let (jar, store) = visitor_store(&state, jar);
    match CartState::new(store.as_ref()).add_item(item) {
        Ok(items) => (jar, Json(CartView::new(items, CartSource::Local))).into_response(),
        Err(e) => storage_error_to_status(&e).into_response(),
    }
}

/// `DELETE /api/cart/items/{id}`
pub async fn remove_cart_item(State(state): State<AppState>, jar: CookieJar, Path(id): Path<String>) -> Response {
    let store = known_store(&state, &jar);
    match CartState::new(store.as_ref()).remove_item(&id) {
        Ok(items) => Json(CartView::new(items, CartSource::Local)).into_response(),
        Err(e) => storage_error_to_status(&e).into_response(),
    }
}

/// `DELETE /api/cart`
pub async fn clear_cart(State(state): State<AppState>, jar: CookieJar) -> Response {
    let store = known_store(&state, &jar);
    match CartState::new(store.as_ref()).clear_cart() {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => storage_error_to_status(&e).into_response(),
    }
}

#[cfg(test)]
#[path = "cart_test.rs"]
mod tests;
