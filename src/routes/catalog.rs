//! Catalog routes — tours and transport options over [`CatalogService`].
//!
//! Handlers are generic over the entity; [`CatalogRoute`] picks the service
//! out of `AppState`. Reads never fail on backend outages (the service falls
//! back to the mock catalog). Writes require a session token.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use super::auth::SessionToken;
use crate::models::{CatalogEntity, FeaturedSummary, Lang, Tour, TransportOption};
use crate::services::catalog::{CatalogError, CatalogService};
use crate::state::AppState;

pub trait CatalogRoute: CatalogEntity {
    fn service(state: &AppState) -> &CatalogService<Self>;
}

impl CatalogRoute for Tour {
    fn service(state: &AppState) -> &CatalogService<Self> {
        &state.tours
    }
}

impl CatalogRoute for TransportOption {
    fn service(state: &AppState) -> &CatalogService<Self> {
        &state.transport
    }
}

pub(crate) fn catalog_error_to_status(err: CatalogError) -> StatusCode {
    match err {
        CatalogError::NotFound { .. } => StatusCode::NOT_FOUND,
        CatalogError::Unauthorized => StatusCode::UNAUTHORIZED,
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FeaturedQuery {
    lang: Option<String>,
}

pub async fn list<T: CatalogRoute>(State(state): State<AppState>) -> Json<Vec<T>> {
    Json(T::service(&state).get_all().await)
}

pub async fn get_one<T: CatalogRoute>(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<T>, StatusCode> {
    let item = T::service(&state)
        .get_by_id(&id)
        .await
        .map_err(catalog_error_to_status)?;
    Ok(Json(item))
}

pub async fn get_by_slug<T: CatalogRoute>(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<T>, StatusCode> {
    let item = T::service(&state)
        .get_by_slug(&slug)
        .await
        .map_err(catalog_error_to_status)?;
    Ok(Json(item))
}

/// `GET …/featured?lang=` — featured entries projected into one language.
pub async fn featured<T: CatalogRoute>(
    State(state): State<AppState>,
    Query(query): Query<FeaturedQuery>,
) -> Json<Vec<FeaturedSummary>> {
    let lang = Lang::from_query(query.lang.as_deref());
    let items = T::service(&state).featured(lang).await;
    Json(items.iter().map(|item| item.summary(lang)).collect())
}

pub async fn create<T: CatalogRoute>(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
    Json(item): Json<T>,
) -> Result<(StatusCode, Json<T>), StatusCode> {
    let created = T::service(&state)
        .create(&token, item)
        .await
        .map_err(catalog_error_to_status)?;
    tracing::info!(resource = T::LABEL, id = created.id(), "catalog entry created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update<T: CatalogRoute>(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
    Path(id): Path<String>,
    Json(item): Json<T>,
) -> Result<Json<T>, StatusCode> {
    let updated = T::service(&state)
        .update(&token, &id, item)
        .await
        .map_err(catalog_error_to_status)?;
    Ok(Json(updated))
}

pub async fn delete<T: CatalogRoute>(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    T::service(&state)
        .delete(&token, &id)
        .await
        .map_err(catalog_error_to_status)?;
    tracing::info!(resource = T::LABEL, %id, "catalog entry deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
