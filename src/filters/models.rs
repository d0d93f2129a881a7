//! Product-list filter models
//!
//! [`FilterCriteria`] is the in-memory form of the list page's query string.
//! Closed enumerations (`Brand`, `SortKey`) carry their own URL tokens.

use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Page size used when the deployment does not configure one.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

// =============================================================================
// Enumerations
// =============================================================================

/// Brands carried by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Brand {
    Tssaper,
    Buffalo,
    Toyama,
}

impl Brand {
    pub const ALL: [Brand; 3] = [Brand::Tssaper, Brand::Buffalo, Brand::Toyama];

    pub fn as_token(self) -> &'static str {
        match self {
            Brand::Tssaper => "Tssaper",
            Brand::Buffalo => "Buffalo",
            Brand::Toyama => "Toyama",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.as_token() == token)
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Columns the product list can be sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    CreatedAt,
    Name,
    Price,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::Name => "name",
            SortField::Price => "price",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Supported `field-direction` sort options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    #[default]
    CreatedAtDesc,
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::CreatedAtDesc,
        SortKey::NameAsc,
        SortKey::NameDesc,
        SortKey::PriceAsc,
        SortKey::PriceDesc,
    ];

    pub fn as_token(self) -> &'static str {
        match self {
            SortKey::CreatedAtDesc => "created_at-desc",
            SortKey::NameAsc => "name-asc",
            SortKey::NameDesc => "name-desc",
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_token() == token)
    }

    pub fn field(self) -> SortField {
        match self {
            SortKey::CreatedAtDesc => SortField::CreatedAt,
            SortKey::NameAsc | SortKey::NameDesc => SortField::Name,
            SortKey::PriceAsc | SortKey::PriceDesc => SortField::Price,
        }
    }

    pub fn direction(self) -> SortDirection {
        match self {
            SortKey::NameAsc | SortKey::PriceAsc => SortDirection::Asc,
            SortKey::CreatedAtDesc | SortKey::NameDesc | SortKey::PriceDesc => SortDirection::Desc,
        }
    }
}

impl Serialize for SortKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_token())
    }
}

impl<'de> Deserialize<'de> for SortKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        SortKey::from_token(&token)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown sort key {token:?}")))
    }
}

// =============================================================================
// Criteria
// =============================================================================

/// Filter, sort and pagination state of the product list.
///
/// Sets keep insertion order, which is the order used when encoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub search_text: String,
    pub category_ids: IndexSet<String>,
    pub brands: IndexSet<Brand>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub in_stock_only: bool,
    pub sort_key: SortKey,
    pub page: u32,
    pub page_size: u32,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl FilterCriteria {
    /// All-default criteria for a deployment's page size.
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            search_text: String::new(),
            category_ids: IndexSet::new(),
            brands: IndexSet::new(),
            price_min: None,
            price_max: None,
            in_stock_only: false,
            sort_key: SortKey::default(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// True when any filter other than sort order or page is set.
    pub fn has_active_filters(&self) -> bool {
        !self.search_text.is_empty()
            || !self.category_ids.is_empty()
            || !self.brands.is_empty()
            || self.price_min.is_some()
            || self.price_max.is_some()
            || self.in_stock_only
    }
}

// =============================================================================
// Partial updates
// =============================================================================

/// A partial change to [`FilterCriteria`]. `None` leaves a field untouched.
///
/// Price bounds use a nested option so a caller can explicitly unset them:
/// `Some(None)` clears the bound, while a missing field keeps it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterUpdate {
    pub search_text: Option<String>,
    pub category_ids: Option<Vec<String>>,
    pub brands: Option<Vec<Brand>>,
    #[serde(deserialize_with = "explicit_option")]
    pub price_min: Option<Option<f64>>,
    #[serde(deserialize_with = "explicit_option")]
    pub price_max: Option<Option<f64>>,
    pub in_stock_only: Option<bool>,
    pub sort_key: Option<SortKey>,
    pub page: Option<u32>,
}

impl FilterUpdate {
    /// True when the update touches anything that changes the result set.
    pub(crate) fn touches_results(&self) -> bool {
        self.search_text.is_some()
            || self.category_ids.is_some()
            || self.brands.is_some()
            || self.price_min.is_some()
            || self.price_max.is_some()
            || self.in_stock_only.is_some()
            || self.sort_key.is_some()
    }
}

/// Maps a present JSON field (including `null`) to `Some(..)`.
fn explicit_option<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}
