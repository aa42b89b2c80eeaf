//! Offline catalog used when the booking backend cannot be reached.
//!
//! TRADE-OFFS
//! ==========
//! Seeded from embedded YAML and held per process: writes are lost on
//! restart and never shared between instances. It exists to keep pages
//! renderable during development, not to stand in for the backend.

use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::CatalogEntity;

pub struct MockCatalog<T> {
    items: Arc<RwLock<Vec<T>>>,
}

impl<T> Clone for MockCatalog<T> {
    fn clone(&self) -> Self {
        Self { items: self.items.clone() }
    }
}

impl<T: CatalogEntity> MockCatalog<T> {
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self { items: Arc::new(RwLock::new(items)) }
    }

    /// Parse a YAML list of entities.
    pub fn from_yaml(src: &str) -> Result<Self, serde_yaml::Error> {
        Ok(Self::new(serde_yaml::from_str(src)?))
    }

    /// Seed from the entity's embedded YAML.
    #[must_use]
    pub fn seeded() -> Self {
        match Self::from_yaml(T::MOCK_SEED) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::error!(resource = T::RESOURCE, error = %e, "mock catalog seed is invalid");
                Self::new(Vec::new())
            }
        }
    }

    pub async fn all(&self) -> Vec<T> {
        self.items.read().await.clone()
    }

    pub async fn find(&self, id: &str) -> Option<T> {
        self.items
            .read()
            .await
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }

    pub async fn find_by_slug(&self, slug: &str) -> Option<T> {
        self.items
            .read()
            .await
            .iter()
            .find(|item| item.slug() == slug)
            .cloned()
    }

    pub async fn featured(&self) -> Vec<T> {
        self.items
            .read()
            .await
            .iter()
            .filter(|item| item.is_featured())
            .cloned()
            .collect()
    }

    /// Append `item` under a fresh `mock-` id.
    pub async fn insert(&self, mut item: T) -> T {
        item.set_id(format!("mock-{}", Uuid::new_v4()));
        self.items.write().await.push(item.clone());
        item
    }

    /// Replace the entity with `id`, keeping that id. `None` if absent.
    pub async fn replace(&self, id: &str, mut item: T) -> Option<T> {
        let mut items = self.items.write().await;
        let slot = items.iter_mut().find(|existing| existing.id() == id)?;
        item.set_id(id.to_owned());
        *slot = item.clone();
        Some(item)
    }

    /// Remove the entity with `id`; `false` if absent.
    pub async fn remove(&self, id: &str) -> bool {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| item.id() != id);
        items.len() != before
    }
}

#[cfg(test)]
#[path = "mock_catalog_test.rs"]
mod tests;
