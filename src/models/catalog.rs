//! Catalog entities: tours and transport options.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::geo::GeoPoint;
use super::i18n::{Lang, LocalizedText};

/// Behaviour shared by every catalog resource the storefront proxies.
pub trait CatalogEntity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Backend collection path, e.g. `tours`.
    const RESOURCE: &'static str;
    /// Backend path of the featured listing (takes a `lang` query).
    const FEATURED_PATH: &'static str;
    /// Singular name used in log fields.
    const LABEL: &'static str;
    /// Embedded YAML used to seed the offline catalog.
    const MOCK_SEED: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn slug(&self) -> &str;
    fn is_featured(&self) -> bool;
    fn summary(&self, lang: Lang) -> FeaturedSummary;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryDay {
    pub day: u32,
    #[serde(default)]
    pub title: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
}

// =============================================================================
// TOUR
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    #[serde(default, alias = "_id")]
    pub id: String,
    pub slug: String,
    pub title: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    pub price: f64,
    #[serde(default)]
    pub duration_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub itinerary: Vec<ItineraryDay>,
}

impl CatalogEntity for Tour {
    const RESOURCE: &'static str = "tours";
    const FEATURED_PATH: &'static str = "tours/featured";
    const LABEL: &'static str = "tour";
    const MOCK_SEED: &'static str = include_str!("../services/mock/tours.yaml");

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn is_featured(&self) -> bool {
        self.featured
    }

    fn summary(&self, lang: Lang) -> FeaturedSummary {
        FeaturedSummary {
            id: self.id.clone(),
            slug: self.slug.clone(),
            title: self.title.get(lang).to_owned(),
            price: self.price,
            image: self.image.clone(),
            origin: None,
            destination: None,
        }
    }
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// A named place on a transport route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStop {
    pub name: String,
    pub location: GeoPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportOption {
    #[serde(default, alias = "_id")]
    pub id: String,
    pub slug: String,
    pub title: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    pub origin: RouteStop,
    pub destination: RouteStop,
    #[serde(default)]
    pub intermediate_stops: Vec<RouteStop>,
    pub price: f64,
    #[serde(default)]
    pub departure_time: String,
    #[serde(default)]
    pub arrival_time: String,
    #[serde(default)]
    pub duration_hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub itinerary: Vec<ItineraryDay>,
}

impl CatalogEntity for TransportOption {
    const RESOURCE: &'static str = "transport";
    const FEATURED_PATH: &'static str = "transport-tours/featured";
    const LABEL: &'static str = "transport";
    const MOCK_SEED: &'static str = include_str!("../services/mock/transport.yaml");

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn is_featured(&self) -> bool {
        self.featured
    }

    fn summary(&self, lang: Lang) -> FeaturedSummary {
        FeaturedSummary {
            id: self.id.clone(),
            slug: self.slug.clone(),
            title: self.title.get(lang).to_owned(),
            price: self.price,
            image: self.image.clone(),
            origin: Some(self.origin.name.clone()),
            destination: Some(self.destination.name.clone()),
        }
    }
}

/// Language-specific card for featured listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedSummary {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}
