use super::*;
use crate::state::test_helpers::{
    FakeBackend, backend_cart_item, body_json, cart_item, empty_request, json_request, location, pending_item, send,
    set_cookies, test_app_state,
};
use crate::models::BackendCart;
use axum::body::Body;
use axum::http::Request;
use serde_json::json;
use uuid::Uuid;

fn with_cookie(mut request: Request<Body>, cookie: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert("cookie", cookie.parse().unwrap());
    request
}

/// Seed the pending cart of a fresh visitor and return its cookie.
fn seed_pending(state: &AppState, items: &[PendingCartItem]) -> String {
    let visitor = Uuid::new_v4();
    PendingCart::new(state.visitors.store_for(visitor).as_ref())
        .save(items)
        .unwrap();
    format!("visitor_id={visitor}")
}

fn pending_for(state: &AppState, cookie: &str) -> Vec<PendingCartItem> {
    let visitor = Uuid::parse_str(cookie.trim_start_matches("visitor_id=").split(';').next().unwrap()).unwrap();
    PendingCart::new(state.visitors.store_for(visitor).as_ref()).get()
}

// =============================================================================
// safe_redirect / login_location
// =============================================================================

#[test]
fn safe_redirect_accepts_local_paths() {
    assert_eq!(safe_redirect(Some("/tours/amantani"), "/checkout"), "/tours/amantani");
    assert_eq!(safe_redirect(Some("/checkout?step=2"), "/checkout"), "/checkout?step=2");
}

#[test]
fn safe_redirect_rejects_foreign_targets() {
    for target in [
        "https://evil.example",
        "//evil.example",
        "/\\evil.example",
        "/\t/evil.example",
        "/\n/evil.example",
        "/a\nb",
        "/a b",
        "tours",
        "",
    ] {
        assert_eq!(safe_redirect(Some(target), "/checkout"), "/checkout", "target {target:?}");
    }
    assert_eq!(safe_redirect(None, "/checkout"), "/checkout");
}

#[test]
fn login_location_encodes_target() {
    assert_eq!(login_location("/checkout?step=2"), "/login?redirect=%2Fcheckout%3Fstep%3D2");
}

// =============================================================================
// sync pages
// =============================================================================

#[tokio::test]
async fn oauth_sync_submits_pending_items_and_redirects_to_checkout() {
    let backend = FakeBackend::up();
    let state = test_app_state(backend.clone());
    let cookie = seed_pending(&state, &[pending_item("tour-1", 2), pending_item("tour-2", 1)]);

    let request = with_cookie(empty_request("GET", "/auth/sync-cart?token=oauth-tok"), &cookie);
    let response = send(state.clone(), request).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/checkout");
    assert!(set_cookies(&response).iter().any(|c| c.starts_with("token=oauth-tok")));

    let requests = backend.cart_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "oauth-tok");
    assert_eq!(requests[0].2.items.len(), 2);
    assert!(pending_for(&state, &cookie).is_empty());
}

#[tokio::test]
async fn oauth_sync_honours_explicit_redirect() {
    let state = test_app_state(FakeBackend::up());
    let cookie = seed_pending(&state, &[pending_item("tour-1", 1)]);
    let request = with_cookie(
        empty_request("GET", "/auth/sync-cart?token=t&redirect=%2Fbookings%2Fmine"),
        &cookie,
    );
    let response = send(state, request).await;
    assert_eq!(location(&response), "/bookings/mine");
}

#[tokio::test]
async fn oauth_sync_without_token_goes_to_login() {
    let backend = FakeBackend::up();
    let response = send(test_app_state(backend.clone()), empty_request("GET", "/auth/sync-cart")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?redirect=%2Fcheckout");
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn login_sync_forwards_even_when_backend_fails() {
    let backend = FakeBackend::down();
    let state = test_app_state(backend.clone());
    let items = vec![pending_item("tour-1", 2)];
    let cookie = seed_pending(&state, &items);

    let request = with_cookie(
        empty_request("GET", "/login/sync-cart?redirect=/checkout"),
        &format!("{cookie}; token=tok-1"),
    );
    let response = send(state.clone(), request).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/checkout");
    assert_eq!(backend.calls(), vec!["create_cart".to_owned()]);
    assert_eq!(pending_for(&state, &cookie), items);
}

#[tokio::test]
async fn login_sync_never_forwards_to_control_characters() {
    for query in ["redirect=/%09/evil.example", "redirect=/a%0Ab", "redirect=/a%0D%0ASet-Cookie:x=1"] {
        let request = with_cookie(empty_request("GET", &format!("/login/sync-cart?{query}")), "token=tok-1");
        let response = send(test_app_state(FakeBackend::up()), request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "query {query}");
        assert_eq!(location(&response), "/checkout", "query {query}");
    }
}

#[tokio::test]
async fn login_sync_with_empty_pending_cart_makes_no_call() {
    let backend = FakeBackend::up();
    let request = with_cookie(empty_request("GET", "/login/sync-cart"), "token=tok-1");
    let response = send(test_app_state(backend.clone()), request).await;
    assert_eq!(location(&response), "/checkout");
    assert!(backend.calls().is_empty());
}

// =============================================================================
// sync API
// =============================================================================

#[tokio::test]
async fn sync_api_without_token_is_unauthorized() {
    let backend = FakeBackend::up();
    let body = json!({ "items": [pending_item("tour-1", 1)] });
    let response = send(test_app_state(backend.clone()), json_request("POST", "/api/sync-cart", &body)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["success"], false);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn sync_api_submits_items_with_bearer_token() {
    let backend = FakeBackend::up();
    let body = json!({ "items": [pending_item("tour-1", 2), pending_item("tour-2", 1)], "totalPrice": 130.0 });
    let mut request = json_request("POST", "/api/sync-cart", &body);
    request
        .headers_mut()
        .insert("authorization", "Bearer tok-9".parse().unwrap());
    let response = send(test_app_state(backend.clone()), request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["synced"], 2);
    assert_eq!(json["data"]["totalPrice"], 130.0);
    assert_eq!(backend.cart_requests()[0].0, "tok-9");
}

#[tokio::test]
async fn sync_api_forwards_client_idempotency_key() {
    let backend = FakeBackend::up();
    let body = json!({ "items": [pending_item("tour-1", 1)] });
    let mut request = with_cookie(json_request("POST", "/api/sync-cart", &body), "token=tok-1");
    request
        .headers_mut()
        .insert("idempotency-key", "client-key-7".parse().unwrap());
    send(test_app_state(backend.clone()), request).await;

    let anonymous_key = with_cookie(json_request("POST", "/api/sync-cart", &body), "token=tok-1");
    send(test_app_state(backend.clone()), anonymous_key).await;

    let requests = backend.cart_requests();
    assert_eq!(requests[0].1, "client-key-7");
    assert!(Uuid::parse_str(&requests[1].1).is_ok());
}

#[tokio::test]
async fn sync_api_empty_items_skip_backend() {
    let backend = FakeBackend::up();
    let request = with_cookie(json_request("POST", "/api/sync-cart", &json!({ "items": [] })), "token=tok-1");
    let response = send(test_app_state(backend.clone()), request).await;
    assert_eq!(body_json(response).await, json!({ "success": true, "synced": 0 }));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn sync_api_reports_backend_failure() {
    let request = with_cookie(
        json_request("POST", "/api/sync-cart", &json!({ "items": [pending_item("tour-1", 1)] })),
        "token=tok-1",
    );
    let response = send(test_app_state(FakeBackend::down()), request).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Failed to sync cart");
    assert!(json["details"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn sync_api_rejects_invalid_items() {
    let mut item = pending_item("tour-1", 1);
    item.number_of_people = 0;
    let request = with_cookie(json_request("POST", "/api/sync-cart", &json!({ "items": [item] })), "token=tok-1");
    let backend = FakeBackend::up();
    let response = send(test_app_state(backend.clone()), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(backend.calls().is_empty());
}

// =============================================================================
// pending cart
// =============================================================================

#[tokio::test]
async fn pending_cart_round_trip_for_one_visitor() {
    let state = test_app_state(FakeBackend::up());

    let first = send(state.clone(), json_request("POST", "/api/pending-cart", &json!(pending_item("tour-1", 1)))).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let cookie = set_cookies(&first)
        .into_iter()
        .find(|c| c.starts_with("visitor_id="))
        .unwrap();
    let cookie = cookie.split(';').next().unwrap().to_owned();

    let second = with_cookie(json_request("POST", "/api/pending-cart", &json!(pending_item("tour-2", 3))), &cookie);
    let listed = body_json(send(state.clone(), second).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 2);
    assert_eq!(listed[1]["productId"], "tour-2");
    assert_eq!(listed[1]["total"], 135.0);

    let cleared = send(state.clone(), with_cookie(empty_request("DELETE", "/api/pending-cart"), &cookie)).await;
    assert_eq!(cleared.status(), StatusCode::NO_CONTENT);

    let after = send(state, with_cookie(empty_request("GET", "/api/pending-cart"), &cookie)).await;
    assert_eq!(body_json(after).await, json!([]));
}

#[tokio::test]
async fn anonymous_reads_do_not_register_visitors() {
    let state = test_app_state(FakeBackend::up());
    for _ in 0..20 {
        send(state.clone(), empty_request("GET", "/api/pending-cart")).await;
        send(state.clone(), empty_request("GET", "/api/cart")).await;
        send(state.clone(), empty_request("DELETE", "/api/cart")).await;
        send(state.clone(), with_cookie(empty_request("GET", "/login/sync-cart"), "token=tok-1")).await;
        let unknown = format!("visitor_id={}", Uuid::new_v4());
        let response = send(state.clone(), with_cookie(empty_request("GET", "/api/pending-cart"), &unknown)).await;
        assert_eq!(body_json(response).await, json!([]));
    }
    assert!(state.visitors.is_empty());
}

#[tokio::test]
async fn pending_cart_put_overwrites() {
    let state = test_app_state(FakeBackend::up());
    let cookie = seed_pending(&state, &[pending_item("old", 1)]);
    let body = json!([pending_item("new-1", 1), pending_item("new-2", 2)]);
    let response = send(state.clone(), with_cookie(json_request("PUT", "/api/pending-cart", &body), &cookie)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let ids: Vec<String> = pending_for(&state, &cookie).into_iter().map(|i| i.product_id).collect();
    assert_eq!(ids, vec!["new-1".to_owned(), "new-2".to_owned()]);
}

#[tokio::test]
async fn pending_cart_rejects_invalid_item() {
    let mut item = pending_item("tour-1", 1);
    item.product_id = " ".into();
    let response = send(test_app_state(FakeBackend::up()), json_request("POST", "/api/pending-cart", &json!(item))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// cart state
// =============================================================================

#[tokio::test]
async fn cart_local_edits_merge_by_id() {
    let state = test_app_state(FakeBackend::up());
    let cookie = format!("visitor_id={}", Uuid::new_v4());

    send(state.clone(), with_cookie(json_request("POST", "/api/cart/items", &json!(cart_item("a", 1))), &cookie)).await;
    let response =
        send(state.clone(), with_cookie(json_request("POST", "/api/cart/items", &json!(cart_item("a", 2))), &cookie))
            .await;
    let view = body_json(response).await;
    assert_eq!(view["items"][0]["quantity"], 3);
    assert_eq!(view["total"], 75.0);
    assert_eq!(view["source"], "local");

    let removed = send(state, with_cookie(empty_request("DELETE", "/api/cart/items/a"), &cookie)).await;
    assert_eq!(body_json(removed).await["items"], json!([]));
}

#[tokio::test]
async fn cart_load_with_session_reads_backend() {
    let backend = FakeBackend::up();
    backend.set_cart(BackendCart { id: None, items: vec![backend_cart_item("b1", 2)], total_price: 80.0 });
    let request = with_cookie(empty_request("GET", "/api/cart?lang=en"), "token=tok-1");
    let view = body_json(send(test_app_state(backend.clone()), request).await).await;

    assert_eq!(view["source"], "backend");
    assert_eq!(view["items"][0]["id"], "b1");
    assert_eq!(backend.calls(), vec!["get_cart".to_owned()]);
}

#[tokio::test]
async fn cart_load_anonymous_is_local() {
    let backend = FakeBackend::up();
    let view = body_json(send(test_app_state(backend.clone()), empty_request("GET", "/api/cart")).await).await;
    assert_eq!(view["source"], "local");
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn cart_rejects_zero_quantity() {
    let request = json_request("POST", "/api/cart/items", &json!(cart_item("a", 0)));
    let response = send(test_app_state(FakeBackend::up()), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
