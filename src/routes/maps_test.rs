use std::sync::Arc;

use super::*;
use crate::config::AppConfig;
use crate::state::test_helpers::{
    FakeBackend, FakeProbe, body_json, json_request, send, test_app_state, test_app_state_with,
};
use serde_json::json;

fn colca() -> serde_json::Value {
    json!({
        "origin": { "lat": -15.6, "lng": -71.9 },
        "destination": { "lat": -13.5, "lng": -72.0 },
        "intermediateStops": [{ "lat": -15.7, "lng": -71.6 }],
    })
}

#[test]
fn map_errors_map_to_statuses() {
    assert_eq!(map_error_to_status(&MapError::MissingApiKey), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(map_error_to_status(&MapError::InvalidCoordinate("origin".into())), StatusCode::BAD_REQUEST);
    assert_eq!(map_error_to_status(&MapError::Unavailable("503".into())), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn static_map_returns_url() {
    let response = send(test_app_state(FakeBackend::up()), json_request("POST", "/api/static-map", &colca())).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let map_url = body["mapUrl"].as_str().unwrap();
    assert!(map_url.contains("key=test-key"));
    assert!(map_url.contains("size=600x400"));
}

#[tokio::test]
async fn static_map_without_key_is_500_and_never_probes() {
    let probe = Arc::new(FakeProbe::answering(true));
    let state = test_app_state_with(AppConfig::default(), FakeBackend::up(), probe.clone());
    let response = send(state, json_request("POST", "/api/static-map", &colca())).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "Google Maps API key not configured");
    assert!(probe.calls().is_empty());
}

#[tokio::test]
async fn static_map_provider_rejection_is_bad_gateway() {
    let config = AppConfig { maps_api_key: Some("k".into()), ..AppConfig::default() };
    let state = test_app_state_with(config, FakeBackend::up(), Arc::new(FakeProbe::answering(false)));
    let response = send(state, json_request("POST", "/api/static-map", &colca())).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn static_map_rejects_out_of_range_coordinates() {
    let mut body = colca();
    body["destination"]["lat"] = json!(91.0);
    let response = send(test_app_state(FakeBackend::up()), json_request("POST", "/api/static-map", &body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn static_map_rejects_malformed_body() {
    let body = json!({ "origin": { "lat": -15.6 } });
    let response = send(test_app_state(FakeBackend::up()), json_request("POST", "/api/static-map", &body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}
