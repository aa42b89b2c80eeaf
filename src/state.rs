//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. Every
//! outside dependency sits behind a trait object: the booking backend
//! (auth, cart, catalogs), the map image probe and the visitor stores. In
//! production one `BackendClient` backs all backend ports; tests hand in
//! fakes through [`AppState::with_backend`].

use std::sync::Arc;

use crate::backend::{AuthApi, BackendClient, BackendError, CartApi, CatalogBackend};
use crate::config::AppConfig;
use crate::models::{Tour, TransportOption};
use crate::services::catalog::CatalogService;
use crate::services::mock_catalog::MockCatalog;
use crate::services::static_map::{HttpProbe, MapError, MapImageProbe, StaticMapService};
use crate::store::VisitorStores;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Maps(#[from] MapError),
}

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: Arc<dyn AuthApi>,
    pub cart_api: Arc<dyn CartApi>,
    pub tours: CatalogService<Tour>,
    pub transport: CatalogService<TransportOption>,
    pub maps: StaticMapService,
    pub visitors: VisitorStores,
}

impl AppState {
    /// Wire the production adapters described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if an outbound HTTP client cannot be built.
    pub fn from_config(config: AppConfig) -> Result<Self, StateError> {
        let backend = Arc::new(BackendClient::new(&config.backend_api_url, config.timeouts)?);
        let probe = Arc::new(HttpProbe::new(config.timeouts)?);
        Ok(Self::with_backend(config, backend, probe))
    }

    /// Wire the state around any backend that serves every port.
    #[must_use]
    pub fn with_backend<B>(config: AppConfig, backend: Arc<B>, probe: Arc<dyn MapImageProbe>) -> Self
    where
        B: AuthApi + CartApi + CatalogBackend<Tour> + CatalogBackend<TransportOption> + 'static,
    {
        let tours_backend: Arc<dyn CatalogBackend<Tour>> = backend.clone();
        let transport_backend: Arc<dyn CatalogBackend<TransportOption>> = backend.clone();
        let maps = StaticMapService::new(config.maps_api_key.clone(), config.static_map_url.clone(), probe);

        Self {
            auth: backend.clone(),
            cart_api: backend,
            tours: CatalogService::new(tours_backend, MockCatalog::seeded()),
            transport: CatalogService::new(transport_backend, MockCatalog::seeded()),
            maps,
            visitors: VisitorStores::with_limits(config.visitor_idle(), config.visitor_capacity),
            config: Arc::new(config),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
