//! In-memory product-listing collaborator
//!
//! Executes a [`QueryDescription`] against a fixed list of products. The demo
//! server uses it in place of the remote catalog.

use crate::error::CatalogError;
use crate::filters::models::{SortDirection, SortField};
use crate::filters::query::{Field, Predicate, QueryDescription};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, path::Path};

/// A catalog product as stored remotely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub brand: String,
    #[serde(default)]
    pub category_id: Option<String>,
    pub price: f64,
    pub stock: u32,
    #[serde(default)]
    pub image_url: String,
    /// RFC 3339 timestamp; compared as text.
    #[serde(default)]
    pub created_at: String,
}

impl ProductRecord {
    fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::CategoryId => self.category_id.as_deref(),
            Field::Brand => Some(self.brand.as_str()),
            Field::Name => Some(self.name.as_str()),
            Field::Price | Field::Stock => None,
        }
    }

    fn number(&self, field: Field) -> Option<f64> {
        match field {
            Field::Price => Some(self.price),
            Field::Stock => Some(f64::from(self.stock)),
            Field::CategoryId | Field::Brand | Field::Name => None,
        }
    }
}

impl Predicate {
    /// Evaluates the predicate against one product.
    pub fn matches(&self, product: &ProductRecord) -> bool {
        match self {
            Predicate::In { field, values } => product
                .text(*field)
                .is_some_and(|v| values.iter().any(|candidate| candidate == v)),
            Predicate::ContainsIgnoreCase { field, needle } => product
                .text(*field)
                .is_some_and(|v| v.to_lowercase().contains(&needle.to_lowercase())),
            Predicate::Gte { field, value } => product.number(*field).is_some_and(|v| v >= *value),
            Predicate::Lte { field, value } => product.number(*field).is_some_and(|v| v <= *value),
            Predicate::Gt { field, value } => product.number(*field).is_some_and(|v| v > *value),
            Predicate::MatchNone => false,
        }
    }
}

/// One page of results plus the total number of matches.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<ProductRecord>,
    pub total_count: usize,
    pub total_pages: u64,
    pub current_page: u64,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Vec<ProductRecord>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<ProductRecord>) -> Self {
        Self { products }
    }

    /// Loads a JSON array of products.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let products = serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(products))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Live stock of a product, as the product-detail collaborator reports it.
    pub fn stock_of(&self, product_id: &str) -> Option<u32> {
        self.products
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| p.stock)
    }

    /// Filters, sorts and paginates according to `query`.
    pub fn fetch(&self, query: &QueryDescription) -> ProductPage {
        let mut matched: Vec<&ProductRecord> = self
            .products
            .iter()
            .filter(|p| query.predicates.iter().all(|pred| pred.matches(p)))
            .collect();

        matched.sort_by(|a, b| {
            let ordering = compare_on(a, b, query.sort.field);
            let ordering = match query.sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            ordering.then_with(|| a.id.cmp(&b.id))
        });

        let total_count = matched.len();
        let limit = u64::from(query.limit.max(1));
        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let products = matched
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .cloned()
            .collect();

        ProductPage {
            products,
            total_count,
            total_pages: (total_count as u64).div_ceil(limit),
            current_page: query.offset / limit + 1,
        }
    }
}

fn compare_on(a: &ProductRecord, b: &ProductRecord, field: SortField) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortField::Price => a.price.total_cmp(&b.price),
    }
}
