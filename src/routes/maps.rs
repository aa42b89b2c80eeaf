//! Static map route.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::services::static_map::{MapError, StaticMapRequest};
use crate::state::AppState;

pub(crate) fn map_error_to_status(err: &MapError) -> StatusCode {
    match err {
        MapError::InvalidCoordinate(_) => StatusCode::BAD_REQUEST,
        MapError::Unavailable(_) => StatusCode::BAD_GATEWAY,
        MapError::MissingApiKey | MapError::BaseUrl(_) | MapError::HttpClientBuild(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// `POST /api/static-map` — `{ mapUrl }` on success, `{ error }` otherwise.
pub async fn static_map(State(state): State<AppState>, payload: Result<Json<StaticMapRequest>, JsonRejection>) -> Response {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            return (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": rejection.body_text() })))
                .into_response();
        }
    };

    match state.maps.map_url(&request).await {
        Ok(map_url) => Json(serde_json::json!({ "mapUrl": map_url })).into_response(),
        Err(e) => {
            let status = map_error_to_status(&e);
            if status.is_server_error() {
                tracing::error!(error = %e, "static map request failed");
            }
            (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
        }
    }
}

#[cfg(test)]
#[path = "maps_test.rs"]
mod tests;
