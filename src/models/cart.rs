//! Cart types: anonymous pending items, the locally cached cart and the
//! backend-owned cart.

use serde::{Deserialize, Serialize};

use super::i18n::{Lang, LocalizedText};
use super::round_cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Tour,
    Transport,
}

// =============================================================================
// PENDING CART
// =============================================================================

/// A purchase an anonymous visitor queued before logging in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCartItem {
    pub product_type: ProductType,
    pub product_id: String,
    pub start_date: String,
    pub number_of_people: u32,
    pub price_per_person: f64,
    #[serde(default)]
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PendingCartItem {
    #[must_use]
    pub fn computed_total(&self) -> f64 {
        round_cents(self.price_per_person * f64::from(self.number_of_people))
    }

    /// Fill in `total` when the client did not supply one.
    #[must_use]
    pub fn with_total(mut self) -> Self {
        if self.total <= 0.0 {
            self.total = self.computed_total();
        }
        self
    }

    /// Reject items the backend would refuse anyway.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.product_id.trim().is_empty() {
            return Err("productId is required");
        }
        if self.start_date.trim().is_empty() {
            return Err("startDate is required");
        }
        if self.number_of_people == 0 {
            return Err("numberOfPeople must be at least 1");
        }
        if !self.price_per_person.is_finite() || self.price_per_person < 0.0 {
            return Err("pricePerPerson must be a non-negative amount");
        }
        Ok(())
    }
}

// =============================================================================
// LOCAL CART
// =============================================================================

/// A line of the cart view served to pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub product_id: String,
    pub product_type: ProductType,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub start_date: String,
    pub quantity: u32,
    pub price_per_person: f64,
    #[serde(default)]
    pub total: f64,
}

impl CartItem {
    pub fn recompute_total(&mut self) {
        self.total = round_cents(self.price_per_person * f64::from(self.quantity));
    }
}

// =============================================================================
// BACKEND CART
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendTourRef {
    #[serde(default)]
    pub title: LocalizedText,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendCartItem {
    #[serde(alias = "_id")]
    pub id: String,
    pub tour_id: String,
    #[serde(default)]
    pub product_type: Option<ProductType>,
    pub number_of_people: u32,
    pub price_per_person: f64,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub tour: Option<BackendTourRef>,
}

impl BackendCartItem {
    #[must_use]
    pub fn into_cart_item(self, lang: Lang) -> CartItem {
        let (title, image) = self
            .tour
            .map(|tour| (tour.title.get(lang).to_owned(), tour.image))
            .unwrap_or_default();
        let total = if self.total > 0.0 {
            self.total
        } else {
            round_cents(self.price_per_person * f64::from(self.number_of_people))
        };
        CartItem {
            id: self.id,
            product_id: self.tour_id,
            product_type: self.product_type.unwrap_or(ProductType::Tour),
            title,
            image,
            start_date: self.start_date,
            quantity: self.number_of_people,
            price_per_person: self.price_per_person,
            total,
        }
    }
}

/// The authoritative cart as the backend returns it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendCart {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub items: Vec<BackendCartItem>,
    #[serde(default)]
    pub total_price: f64,
}

/// One line of the cart-creation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub tour_id: String,
    pub product_type: ProductType,
    pub start_date: String,
    pub number_of_people: u32,
    pub price_per_person: f64,
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<&PendingCartItem> for CartLine {
    fn from(item: &PendingCartItem) -> Self {
        let total = if item.total > 0.0 { item.total } else { item.computed_total() };
        Self {
            tour_id: item.product_id.clone(),
            product_type: item.product_type,
            start_date: item.start_date.clone(),
            number_of_people: item.number_of_people,
            price_per_person: item.price_per_person,
            total,
            notes: item.notes.clone(),
        }
    }
}

/// Body of `POST /cart` on the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCartRequest {
    pub items: Vec<CartLine>,
    pub total_price: f64,
}

#[cfg(test)]
#[path = "cart_test.rs"]
mod tests;
