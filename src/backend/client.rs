//! reqwest adapter for the booking backend REST API.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;

use super::{AuthApi, BackendError, CartApi, CatalogBackend, parse_error_message, parse_payload};
use crate::config::HttpTimeouts;
use crate::models::auth::{LoginRequest, LoginResponse};
use crate::models::{BackendCart, CatalogEntity, CreateCartRequest, Lang};

pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Build a client for the backend rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeouts: HttpTimeouts) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request())
            .connect_timeout(timeouts.connect())
            .build()
            .map_err(|e| BackendError::HttpClientBuild(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self { http, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `<base>/<resource>/<segments..>`, each segment percent-encoded so an
    /// id can never climb out of its resource or add a query.
    fn entity_url(&self, resource: &str, segments: &[&str]) -> Result<Url, BackendError> {
        if segments
            .iter()
            .any(|segment| segment.is_empty() || matches!(*segment, "." | ".."))
        {
            return Err(BackendError::InvalidUrl(format!("bad path segment in {segments:?}")));
        }
        let mut url = Url::parse(&self.url(resource)).map_err(|e| BackendError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| BackendError::InvalidUrl(self.base_url.clone()))?
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, req: RequestBuilder) -> Result<String, BackendError> {
        let response = req
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(BackendError::Upstream { status: status.as_u16(), message: parse_error_message(&body) });
        }
        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, BackendError> {
        let body = self.send(req).await?;
        parse_payload(&body)
    }
}

// =============================================================================
// AUTH + CART
// =============================================================================

#[async_trait]
impl AuthApi for BackendClient {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, BackendError> {
        self.send_json(self.http.post(self.url("auth/login")).json(req))
            .await
    }
}

#[async_trait]
impl CartApi for BackendClient {
    async fn create_cart(
        &self,
        token: &str,
        idempotency_key: &str,
        req: &CreateCartRequest,
    ) -> Result<BackendCart, BackendError> {
        let request = self
            .http
            .post(self.url("cart"))
            .bearer_auth(token)
            .header(IDEMPOTENCY_HEADER, idempotency_key)
            .json(req);
        self.send_json(request).await
    }

    async fn get_cart(&self, token: &str) -> Result<BackendCart, BackendError> {
        self.send_json(self.http.get(self.url("cart")).bearer_auth(token))
            .await
    }
}

// =============================================================================
// CATALOG
// =============================================================================

#[async_trait]
impl<T: CatalogEntity> CatalogBackend<T> for BackendClient {
    async fn list(&self) -> Result<Vec<T>, BackendError> {
        self.send_json(self.http.get(self.url(T::RESOURCE))).await
    }

    async fn get(&self, id: &str) -> Result<T, BackendError> {
        let url = self.entity_url(T::RESOURCE, &[id])?;
        self.send_json(self.http.get(url)).await
    }

    async fn get_by_slug(&self, slug: &str) -> Result<T, BackendError> {
        let url = self.entity_url(T::RESOURCE, &["slug", slug])?;
        self.send_json(self.http.get(url)).await
    }

    async fn featured(&self, lang: Lang) -> Result<Vec<T>, BackendError> {
        let request = self
            .http
            .get(self.url(T::FEATURED_PATH))
            .query(&[("lang", lang.as_str())]);
        self.send_json(request).await
    }

    async fn create(&self, token: &str, item: &T) -> Result<T, BackendError> {
        let request = self
            .http
            .post(self.url(T::RESOURCE))
            .bearer_auth(token)
            .json(item);
        self.send_json(request).await
    }

    async fn update(&self, token: &str, id: &str, item: &T) -> Result<T, BackendError> {
        let request = self
            .http
            .put(self.entity_url(T::RESOURCE, &[id])?)
            .bearer_auth(token)
            .json(item);
        self.send_json(request).await
    }

    async fn delete(&self, token: &str, id: &str) -> Result<(), BackendError> {
        let request = self
            .http
            .delete(self.entity_url(T::RESOURCE, &[id])?)
            .bearer_auth(token);
        self.send(request).await.map(|_| ())
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
