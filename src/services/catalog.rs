//! Catalog service — backend-first reads and writes with an offline fallback.
//!
//! ERROR HANDLING
//! ==============
//! Any backend failure on a read falls back to [`MockCatalog`] with a
//! warning. Writes fall back the same way except when the backend rejects
//! the caller's token: that surfaces as `Unauthorized` instead of silently
//! editing the offline copy.

use std::sync::Arc;

use crate::backend::{BackendError, CatalogBackend};
use crate::models::{CatalogEntity, Lang};
use crate::services::mock_catalog::MockCatalog;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("{resource} not found: {key}")]
    NotFound { resource: &'static str, key: String },
    #[error("backend rejected credentials")]
    Unauthorized,
}

pub struct CatalogService<T: CatalogEntity> {
    backend: Arc<dyn CatalogBackend<T>>,
    mock: MockCatalog<T>,
}

impl<T: CatalogEntity> Clone for CatalogService<T> {
    fn clone(&self) -> Self {
        Self { backend: self.backend.clone(), mock: self.mock.clone() }
    }
}

impl<T: CatalogEntity> CatalogService<T> {
    #[must_use]
    pub fn new(backend: Arc<dyn CatalogBackend<T>>, mock: MockCatalog<T>) -> Self {
        Self { backend, mock }
    }

    pub async fn get_all(&self) -> Vec<T> {
        match self.backend.list().await {
            Ok(items) => items,
            Err(e) => {
                warn_fallback::<T>("list", &e);
                self.mock.all().await
            }
        }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<T, CatalogError> {
        match self.backend.get(id).await {
            Ok(item) => Ok(item),
            Err(e) => {
                warn_fallback::<T>("get", &e);
                self.mock.find(id).await.ok_or_else(|| not_found::<T>(id))
            }
        }
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<T, CatalogError> {
        match self.backend.get_by_slug(slug).await {
            Ok(item) => Ok(item),
            Err(e) => {
                warn_fallback::<T>("get_by_slug", &e);
                self.mock
                    .find_by_slug(slug)
                    .await
                    .ok_or_else(|| not_found::<T>(slug))
            }
        }
    }

    pub async fn featured(&self, lang: Lang) -> Vec<T> {
        match self.backend.featured(lang).await {
            Ok(items) => items,
            Err(e) => {
                warn_fallback::<T>("featured", &e);
                self.mock.featured().await
            }
        }
    }

    pub async fn create(&self, token: &str, item: T) -> Result<T, CatalogError> {
        match self.backend.create(token, &item).await {
            Ok(created) => Ok(created),
            Err(e) if e.is_unauthorized() => Err(CatalogError::Unauthorized),
            Err(e) => {
                warn_fallback::<T>("create", &e);
                Ok(self.mock.insert(item).await)
            }
        }
    }

    pub async fn update(&self, token: &str, id: &str, item: T) -> Result<T, CatalogError> {
        match self.backend.update(token, id, &item).await {
            Ok(updated) => Ok(updated),
            Err(e) if e.is_unauthorized() => Err(CatalogError::Unauthorized),
            Err(e) => {
                warn_fallback::<T>("update", &e);
                self.mock
                    .replace(id, item)
                    .await
                    .ok_or_else(|| not_found::<T>(id))
            }
        }
    }

    pub async fn delete(&self, token: &str, id: &str) -> Result<(), CatalogError> {
        match self.backend.delete(token, id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_unauthorized() => Err(CatalogError::Unauthorized),
            Err(e) => {
                warn_fallback::<T>("delete", &e);
                if self.mock.remove(id).await { Ok(()) } else { Err(not_found::<T>(id)) }
            }
        }
    }
}

fn warn_fallback<T: CatalogEntity>(op: &'static str, err: &BackendError) {
    tracing::warn!(resource = T::LABEL, op, error = %err, "backend unavailable, using mock catalog");
}

fn not_found<T: CatalogEntity>(key: &str) -> CatalogError {
    CatalogError::NotFound { resource: T::LABEL, key: key.to_owned() }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
