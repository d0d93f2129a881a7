//! Shopping Cart Business Logic Helpers
//!
//! This module contains the codec for the durable cart mirror, the invariant
//! checks applied to anything read back from it, and formatting helpers.

use super::models::{CartLine, CartTotals};
use crate::error::MirrorError;
use std::collections::HashSet;
use uuid::Uuid;

/// Returns the provided session id or creates a new UUID string when `None`.
///
/// This guarantees that every cart operation works with a non-empty identifier.
pub fn get_or_create_session_id(session_id: Option<String>) -> String {
    session_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string())
}

/// Serializes cart lines into the durable mirror format (a JSON array).
pub fn encode_cart(lines: &[CartLine]) -> Result<String, serde_json::Error> {
    serde_json::to_string(lines)
}

/// Parses and validates a durable mirror.
///
/// There is no partial repair: one bad line discards the whole mirror.
pub fn decode_cart(raw: &str) -> Result<Vec<CartLine>, MirrorError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let lines: Vec<CartLine> = serde_json::from_str(raw)?;

    let mut seen = HashSet::with_capacity(lines.len());
    for line in &lines {
        validate_line(line)?;
        if !seen.insert(line.product_id.as_str()) {
            return Err(MirrorError::DuplicateLine {
                product_id: line.product_id.clone(),
            });
        }
    }

    Ok(lines)
}

/// Checks the per-line invariants: `1 <= quantity <= stock_limit` plus
/// [`validate_product_fields`].
pub fn validate_line(line: &CartLine) -> Result<(), MirrorError> {
    validate_product_fields(&line.product_id, line.unit_price)?;
    if line.quantity < 1 {
        return Err(MirrorError::ZeroQuantity {
            product_id: line.product_id.clone(),
        });
    }
    if line.quantity > line.stock_limit {
        return Err(MirrorError::AboveStockLimit {
            product_id: line.product_id.clone(),
            quantity: line.quantity,
            stock_limit: line.stock_limit,
        });
    }
    Ok(())
}

/// Product fields every line must carry: a non-empty id and a finite,
/// non-negative price. Shared by `CartStore::add` and the mirror loader.
pub fn validate_product_fields(product_id: &str, unit_price: f64) -> Result<(), MirrorError> {
    if product_id.is_empty() {
        return Err(MirrorError::EmptyProductId);
    }
    if !unit_price.is_finite() || unit_price < 0.0 {
        return Err(MirrorError::InvalidPrice {
            product_id: product_id.to_string(),
            unit_price,
        });
    }
    Ok(())
}

/// Sums quantities and `quantity * unit_price` over all lines.
pub fn compute_totals(lines: &[CartLine]) -> CartTotals {
    lines.iter().fold(CartTotals::default(), |acc, line| CartTotals {
        item_count: acc.item_count + u64::from(line.quantity),
        amount: acc.amount + line.subtotal(),
    })
}

/// Produces a human-readable one-line summary for a list of cart lines.
///
/// Example output: `"2x Apple, 1x Banana"`.
pub fn format_item_summary(lines: &[CartLine]) -> String {
    lines
        .iter()
        .map(|l| format!("{}x {}", l.quantity, l.name))
        .collect::<Vec<_>>()
        .join(", ")
}
