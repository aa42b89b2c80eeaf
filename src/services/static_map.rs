//! Static route map — URL construction for the map image provider.
//!
//! DESIGN
//! ======
//! The route returns a URL rather than proxying image bytes. Before handing
//! it out, one HEAD request confirms the provider accepts it. Failed checks
//! are not retried and generated URLs are not cached.
//!
//! Markers: origin `A` (green), destination `B` (red), intermediate stops
//! numbered from 1 (blue). The path runs origin → stops → destination.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::config::HttpTimeouts;
use crate::models::GeoPoint;

const MAP_SIZE: &str = "600x400";
const MAP_SCALE: &str = "2";
const MAP_TYPE: &str = "roadmap";
const ORIGIN_MARKER: &str = "color:green|label:A";
const DESTINATION_MARKER: &str = "color:red|label:B";
const STOP_MARKER_COLOR: &str = "color:blue";
const PATH_STYLE: &str = "color:0x1e40afcc|weight:4";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticMapRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    #[serde(default)]
    pub intermediate_stops: Option<Vec<GeoPoint>>,
}

impl StaticMapRequest {
    fn stops(&self) -> &[GeoPoint] {
        self.intermediate_stops.as_deref().unwrap_or_default()
    }

    fn validate(&self) -> Result<(), MapError> {
        if !self.origin.is_valid() {
            return Err(MapError::InvalidCoordinate("origin".into()));
        }
        if !self.destination.is_valid() {
            return Err(MapError::InvalidCoordinate("destination".into()));
        }
        if let Some(idx) = self.stops().iter().position(|p| !p.is_valid()) {
            return Err(MapError::InvalidCoordinate(format!("intermediateStops[{idx}]")));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MapError {
    #[error("Google Maps API key not configured")]
    MissingApiKey,
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
    #[error("invalid static map base URL: {0}")]
    BaseUrl(String),
    #[error("map image unavailable: {0}")]
    Unavailable(String),
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// Build the provider URL for `req`.
///
/// # Errors
///
/// Returns an error if a coordinate is out of range or `base_url` does not
/// parse.
pub fn build_map_url(base_url: &str, api_key: &str, req: &StaticMapRequest) -> Result<Url, MapError> {
    req.validate()?;

    let mut params: Vec<(&str, String)> = vec![
        ("size", MAP_SIZE.to_owned()),
        ("scale", MAP_SCALE.to_owned()),
        ("maptype", MAP_TYPE.to_owned()),
        ("markers", format!("{ORIGIN_MARKER}|{}", req.origin.to_pair())),
        ("markers", format!("{DESTINATION_MARKER}|{}", req.destination.to_pair())),
    ];
    for (idx, stop) in req.stops().iter().enumerate() {
        params.push(("markers", format!("{STOP_MARKER_COLOR}|label:{}|{}", idx + 1, stop.to_pair())));
    }

    let path_points = std::iter::once(&req.origin)
        .chain(req.stops())
        .chain(std::iter::once(&req.destination))
        .map(GeoPoint::to_pair)
        .collect::<Vec<_>>()
        .join("|");
    params.push(("path", format!("{PATH_STYLE}|{path_points}")));
    params.push(("key", api_key.to_owned()));

    Url::parse_with_params(base_url, &params).map_err(|e| MapError::BaseUrl(e.to_string()))
}

/// The URL with the API key masked, for logs.
#[must_use]
pub fn redacted(url: &Url) -> String {
    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = if k == "key" { "***".to_owned() } else { v.into_owned() };
            (k.into_owned(), value)
        })
        .collect();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}

// =============================================================================
// PROBE
// =============================================================================

#[async_trait]
pub trait MapImageProbe: Send + Sync {
    /// Whether the provider serves an image at `url`.
    async fn exists(&self, url: &Url) -> Result<bool, MapError>;
}

pub struct HttpProbe {
    http: reqwest::Client,
}

impl HttpProbe {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeouts: HttpTimeouts) -> Result<Self, MapError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request())
            .connect_timeout(timeouts.connect())
            .build()
            .map_err(|e| MapError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl MapImageProbe for HttpProbe {
    async fn exists(&self, url: &Url) -> Result<bool, MapError> {
        let response = self
            .http
            .head(url.clone())
            .send()
            .await
            .map_err(|e| MapError::Unavailable(e.to_string()))?;
        Ok(response.status().is_success())
    }
}

// =============================================================================
// SERVICE
// =============================================================================

#[derive(Clone)]
pub struct StaticMapService {
    api_key: Option<String>,
    base_url: String,
    probe: Arc<dyn MapImageProbe>,
}

impl StaticMapService {
    #[must_use]
    pub fn new(api_key: Option<String>, base_url: impl Into<String>, probe: Arc<dyn MapImageProbe>) -> Self {
        Self { api_key, base_url: base_url.into(), probe }
    }

    /// Build and verify a map URL for `req`.
    ///
    /// # Errors
    ///
    /// `MissingApiKey` before any outbound request when no key is configured;
    /// `Unavailable` when the provider does not serve the image.
    pub async fn map_url(&self, req: &StaticMapRequest) -> Result<String, MapError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(MapError::MissingApiKey);
        };
        let url = build_map_url(&self.base_url, api_key, req)?;

        match self.probe.exists(&url).await {
            Ok(true) => Ok(url.into()),
            Ok(false) => {
                tracing::warn!(url = %redacted(&url), "map provider rejected static map request");
                Err(MapError::Unavailable("provider returned an error status".into()))
            }
            Err(e) => {
                tracing::warn!(url = %redacted(&url), error = %e, "map provider unreachable");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
#[path = "static_map_test.rs"]
mod tests;
