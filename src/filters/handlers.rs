//! REST API handlers for the product list
//!
//! The query string is the only filter state; each request rebuilds a
//! [`FilterQueryState`] from it and answers with the canonical form.

use super::{
    models::{FilterCriteria, FilterUpdate},
    query::QueryDescription,
    state::{FilterQueryState, MemoryLocation, QueryLocation},
};
use crate::catalog::ProductPage;
use crate::state::SharedState;
use axum::{
    extract::{RawQuery, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

/// Creates routes for product listing and filter operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/filters/update", post(update_filters))
        .route("/filters/clear", post(clear_filters))
}

/// Response for `GET /products`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    /// Canonical query string for the request
    pub query: String,
    pub criteria: FilterCriteria,
    pub has_active_filters: bool,
    /// Malformed query values that were replaced by defaults
    pub fallbacks: u64,
    pub description: QueryDescription,
    pub page: ProductPage,
}

/// Input for filter mutations
#[derive(Debug, Deserialize)]
pub struct FilterMutationInput {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub update: FilterUpdate,
}

/// Response for filter mutations
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterStateResponse {
    pub query: String,
    pub criteria: FilterCriteria,
    pub has_active_filters: bool,
}

/// Endpoint: GET /products
async fn list_products(
    State(state): State<SharedState>,
    RawQuery(raw): RawQuery,
) -> Json<ProductListResponse> {
    let filters = FilterQueryState::new(
        MemoryLocation::new(raw.unwrap_or_default()),
        state.config.page_size,
    );
    let description = filters.compile();
    let page = state.catalog.fetch(&description);

    Json(ProductListResponse {
        query: filters.encoded().to_string(),
        criteria: filters.criteria().clone(),
        has_active_filters: filters.has_active_filters(),
        fallbacks: filters.fallback_count(),
        description,
        page,
    })
}

/// Endpoint: POST /filters/update
async fn update_filters(
    State(state): State<SharedState>,
    Json(payload): Json<FilterMutationInput>,
) -> Json<FilterStateResponse> {
    let mut filters = FilterQueryState::new(
        MemoryLocation::new(payload.query),
        state.config.page_size,
    );
    filters.update(payload.update);
    Json(state_response(&filters))
}

/// Endpoint: POST /filters/clear
async fn clear_filters(
    State(state): State<SharedState>,
    Json(payload): Json<FilterMutationInput>,
) -> Json<FilterStateResponse> {
    let mut filters = FilterQueryState::new(
        MemoryLocation::new(payload.query),
        state.config.page_size,
    );
    filters.clear();
    Json(state_response(&filters))
}

fn state_response(filters: &FilterQueryState<MemoryLocation>) -> FilterStateResponse {
    FilterStateResponse {
        query: filters.location().current(),
        criteria: filters.criteria().clone(),
        has_active_filters: filters.has_active_filters(),
    }
}
