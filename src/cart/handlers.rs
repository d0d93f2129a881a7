//! REST API handlers for shopping cart operations
//!
//! Each browser session gets its own cart, identified by the
//! `cart_session` cookie.

use super::{helpers::get_or_create_session_id, models::*, CartStore};
use crate::error::CartError;
use crate::state::{SharedState, SharedStorage};
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "cart_session";

/// Creates routes for cart-related operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/cart", get(get_cart).delete(clear_cart))
        .route("/cart/items", post(add_item))
        .route(
            "/cart/items/:product_id",
            put(set_quantity).delete(remove_item),
        )
        .route("/checkout", post(checkout))
}

/// Endpoint: GET /cart
async fn get_cart(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let (session_id, is_new_session) = resolve_session_id(&headers);
    let view = state.view_cart(&session_id, cart_view);
    with_session_cookie(Json(view).into_response(), &session_id, is_new_session)
}

/// Endpoint: POST /cart/items
async fn add_item(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<AddToCartInput>,
) -> Response {
    let (session_id, is_new_session) = resolve_session_id(&headers);
    let result = state.with_cart(&session_id, |cart| {
        cart.add(&payload.product, payload.stock_limit)
            .map(|mutation| mutation_response(cart, mutation))
    });
    with_session_cookie(respond(result), &session_id, is_new_session)
}

/// Endpoint: PUT /cart/items/:product_id
async fn set_quantity(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
    Json(payload): Json<SetQuantityInput>,
) -> Response {
    let (session_id, is_new_session) = resolve_session_id(&headers);
    let result = state.with_cart(&session_id, |cart| {
        cart.set_quantity(&product_id, payload.quantity)
            .map(|mutation| mutation_response(cart, mutation))
    });
    with_session_cookie(respond(result), &session_id, is_new_session)
}

/// Endpoint: DELETE /cart/items/:product_id
async fn remove_item(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
) -> Response {
    let (session_id, is_new_session) = resolve_session_id(&headers);
    let response = state.with_cart(&session_id, |cart| {
        let mutation = cart.remove(&product_id);
        mutation_response(cart, mutation)
    });
    with_session_cookie(Json(response).into_response(), &session_id, is_new_session)
}

/// Endpoint: DELETE /cart
async fn clear_cart(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let (session_id, is_new_session) = resolve_session_id(&headers);
    let response = state.with_cart(&session_id, |cart| {
        let mutation = cart.clear();
        mutation_response(cart, mutation)
    });
    with_session_cookie(Json(response).into_response(), &session_id, is_new_session)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    handoff: Option<super::checkout::OrderHandoff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mutation: Option<Mutation>,
}

/// Endpoint: POST /checkout
/// Hands the order off to the messaging channel and clears the cart
async fn checkout(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let (session_id, is_new_session) = resolve_session_id(&headers);
    let recipient = state.config.handoff_recipient.clone();
    let body = match state.with_cart(&session_id, |cart| cart.checkout(&recipient)) {
        Some((handoff, mutation)) => CheckoutResponse {
            status: "checked_out",
            handoff: Some(handoff),
            mutation: Some(mutation),
        },
        None => CheckoutResponse {
            status: "empty",
            handoff: None,
            mutation: None,
        },
    };
    with_session_cookie(Json(body).into_response(), &session_id, is_new_session)
}

// =============================================================================
// Helpers
// =============================================================================

/// Reads the session cookie; returns a fresh id and `true` when absent.
pub fn resolve_session_id(headers: &HeaderMap) -> (String, bool) {
    let existing = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string());

    let is_new = existing.is_none();
    (get_or_create_session_id(existing), is_new)
}

fn with_session_cookie(mut response: Response, session_id: &str, is_new_session: bool) -> Response {
    if is_new_session {
        let cookie = format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

fn cart_view(cart: &CartStore<SharedStorage>) -> CartView {
    CartView {
        items: cart.lines().to_vec(),
        totals: cart.totals(),
    }
}

fn mutation_response(cart: &CartStore<SharedStorage>, mutation: Mutation) -> MutationResponse {
    MutationResponse {
        mutation,
        cart: cart_view(cart),
    }
}

fn respond(result: Result<MutationResponse, CartError>) -> Response {
    match result {
        Ok(body) => Json(body).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for CartError {
    fn into_response(self) -> Response {
        let status = match self {
            CartError::OutOfStock { .. } | CartError::StockExceeded { .. } => StatusCode::CONFLICT,
            CartError::InvalidQuantity(_)
            | CartError::InvalidPrice { .. }
            | CartError::EmptyProductId => StatusCode::UNPROCESSABLE_ENTITY,
        };
        tracing::debug!(kind = self.kind(), error = %self, "cart mutation rejected");
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
