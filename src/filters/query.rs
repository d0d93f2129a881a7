//! Compilation of filter criteria into a declarative query description
//!
//! The description is plain data handed to the product-listing collaborator.
//! Nothing here executes a fetch.

use super::models::{FilterCriteria, SortDirection, SortField};
use serde::Serialize;

/// Product columns a predicate can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    CategoryId,
    Brand,
    Name,
    Price,
    Stock,
}

/// One filter condition. All predicates of a query are combined with AND.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Predicate {
    /// `field` equals one of `values`.
    In { field: Field, values: Vec<String> },
    /// `field` contains `needle`, ignoring case.
    ContainsIgnoreCase { field: Field, needle: String },
    /// `field >= value`
    Gte { field: Field, value: f64 },
    /// `field <= value`
    Lte { field: Field, value: f64 },
    /// `field > value`
    Gt { field: Field, value: f64 },
    /// Matches no row at all.
    MatchNone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortClause {
    pub field: SortField,
    pub direction: SortDirection,
}

/// Predicates, sort and pagination bounds for one page of products.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescription {
    pub predicates: Vec<Predicate>,
    pub sort: SortClause,
    pub offset: u64,
    pub limit: u32,
}

impl QueryDescription {
    /// True when the predicates can never match, whatever the catalog holds.
    pub fn matches_nothing(&self) -> bool {
        self.predicates.contains(&Predicate::MatchNone)
    }
}

/// Compiles `criteria` in a fixed order: containment, substring, range,
/// stock, then sort and pagination.
///
/// An inverted price range (`min > max`) compiles to [`Predicate::MatchNone`]
/// instead of a range.
pub fn compile_query(criteria: &FilterCriteria) -> QueryDescription {
    let mut predicates = Vec::new();

    if !criteria.category_ids.is_empty() {
        predicates.push(Predicate::In {
            field: Field::CategoryId,
            values: criteria.category_ids.iter().cloned().collect(),
        });
    }
    if !criteria.brands.is_empty() {
        predicates.push(Predicate::In {
            field: Field::Brand,
            values: criteria
                .brands
                .iter()
                .map(|b| b.as_token().to_string())
                .collect(),
        });
    }

    if !criteria.search_text.is_empty() {
        predicates.push(Predicate::ContainsIgnoreCase {
            field: Field::Name,
            needle: criteria.search_text.to_lowercase(),
        });
    }

    match (criteria.price_min, criteria.price_max) {
        (Some(min), Some(max)) if min > max => predicates.push(Predicate::MatchNone),
        (min, max) => {
            if let Some(value) = min {
                predicates.push(Predicate::Gte {
                    field: Field::Price,
                    value,
                });
            }
            if let Some(value) = max {
                predicates.push(Predicate::Lte {
                    field: Field::Price,
                    value,
                });
            }
        }
    }

    if criteria.in_stock_only {
        predicates.push(Predicate::Gt {
            field: Field::Stock,
            value: 0.0,
        });
    }

    let page_size = criteria.page_size.max(1);
    QueryDescription {
        predicates,
        sort: SortClause {
            field: criteria.sort_key.field(),
            direction: criteria.sort_key.direction(),
        },
        offset: u64::from(criteria.page.max(1) - 1) * u64::from(page_size),
        limit: page_size,
    }
}
