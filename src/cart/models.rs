//! Shopping Cart Domain Models
//!
//! This module contains all data structures related to the shopping cart
//! business domain.

use crate::error::PersistenceWarning;
use serde::{Deserialize, Serialize};

// =============================================================================
// Cart Domain Models
// =============================================================================

/// A product as presented by the product-detail collaborator at add time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub price: f64,
    #[serde(default)]
    pub image_url: String,
}

/// One line of the cart, uniquely keyed by `product_id`.
///
/// This is also the shape of each element of the durable mirror.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub brand: String,
    pub unit_price: f64,
    pub image_url: String,
    pub quantity: u32,
    /// Stock snapshot taken at the last successful add or update.
    pub stock_limit: u32,
}

impl CartLine {
    pub(crate) fn from_product(product: &Product, stock_limit: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            unit_price: product.price,
            image_url: product.image_url.clone(),
            quantity: 1,
            stock_limit,
        }
    }

    pub fn subtotal(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }
}

/// Aggregates derived from the current cart contents.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: u64,
    pub amount: f64,
}

/// What a successful mutation did to the cart.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MutationKind {
    Added,
    Incremented { quantity: u32 },
    QuantitySet { quantity: u32 },
    Removed,
    Cleared,
    /// Nothing to do; no write was issued.
    Unchanged,
}

/// Result of a committed mutation, with any persistence warning it produced.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Mutation {
    #[serde(flatten)]
    pub kind: MutationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<PersistenceWarning>,
}

impl Mutation {
    pub(crate) fn unchanged() -> Self {
        Self {
            kind: MutationKind::Unchanged,
            warning: None,
        }
    }
}

/// How the cart was initialised from its durable mirror.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LoadOutcome {
    /// No mirror was stored.
    Empty,
    /// The mirror was valid and `lines` lines were restored.
    Restored { lines: usize },
    /// The mirror was present but malformed or invalid; it was discarded whole.
    Discarded { reason: String },
    /// The storage read itself failed.
    Failed { warning: PersistenceWarning },
}

// =============================================================================
// HTTP payloads
// =============================================================================

/// Input for `POST /cart/items`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartInput {
    pub product: Product,
    /// Live stock figure at the moment of the add
    pub stock_limit: u32,
}

/// Input for `PUT /cart/items/:productId`
#[derive(Debug, Deserialize)]
pub struct SetQuantityInput {
    pub quantity: i64,
}

/// Cart contents as returned to the UI
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub totals: CartTotals,
}

/// Response for cart mutations
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub mutation: Mutation,
    pub cart: CartView,
}
