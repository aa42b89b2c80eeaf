//! Booking backend — ports and the reqwest adapter.
//!
//! ARCHITECTURE
//! ============
//! Services depend on the traits below rather than on `BackendClient`, so
//! route and service tests swap in in-memory fakes. `BackendClient`
//! implements every port against the REST API at `BACKEND_API_URL`.
//!
//! ERROR HANDLING
//! ==============
//! Upstream status codes survive as `BackendError::Upstream` so callers can
//! tell an expired token (401) apart from an unreachable backend.

pub mod client;

use async_trait::async_trait;
use serde::Deserialize;

pub use client::BackendClient;

use crate::models::auth::{LoginRequest, LoginResponse};
use crate::models::{BackendCart, CatalogEntity, CreateCartRequest, Lang};

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend transport error: {0}")]
    Transport(String),
    #[error("backend upstream error {status}")]
    Upstream { status: u16, message: Option<String> },
    #[error("backend response decode error: {0}")]
    Decode(String),
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl BackendError {
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Human-readable detail suitable for a JSON `details` field.
    #[must_use]
    pub fn details(&self) -> String {
        match self {
            Self::Upstream { message: Some(message), .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

// =============================================================================
// PORTS
// =============================================================================

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, BackendError>;
}

#[async_trait]
pub trait CartApi: Send + Sync {
    /// Submit items in one request. `idempotency_key` lets the backend drop
    /// a replayed submission.
    async fn create_cart(
        &self,
        token: &str,
        idempotency_key: &str,
        req: &CreateCartRequest,
    ) -> Result<BackendCart, BackendError>;

    async fn get_cart(&self, token: &str) -> Result<BackendCart, BackendError>;
}

#[async_trait]
pub trait CatalogBackend<T: CatalogEntity>: Send + Sync {
    async fn list(&self) -> Result<Vec<T>, BackendError>;
    async fn get(&self, id: &str) -> Result<T, BackendError>;
    async fn get_by_slug(&self, slug: &str) -> Result<T, BackendError>;
    async fn featured(&self, lang: Lang) -> Result<Vec<T>, BackendError>;
    async fn create(&self, token: &str, item: &T) -> Result<T, BackendError>;
    async fn update(&self, token: &str, id: &str, item: &T) -> Result<T, BackendError>;
    async fn delete(&self, token: &str, id: &str) -> Result<(), BackendError>;
}

// =============================================================================
// WIRE HELPERS
// =============================================================================

/// The backend answers either with the payload itself or wrapped in `data`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } => data,
            Self::Bare(value) => value,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn parse_payload<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, BackendError> {
    serde_json::from_str::<Envelope<T>>(body)
        .map(Envelope::into_inner)
        .map_err(|e| BackendError::Decode(e.to_string()))
}

fn parse_error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed.message.or(parsed.error).filter(|m| !m.is_empty())
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
