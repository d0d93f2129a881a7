//! Shopping Cart State Management
//!
//! [`CartStore`] owns the authoritative list of cart lines and its durable
//! mirror. Every mutation runs validate, apply, sync in one call: the new
//! line list is built and checked first, committed in a single assignment,
//! and then written through the storage collaborator before returning.

use super::{
    checkout::{build_handoff, OrderHandoff},
    helpers::{
        compute_totals, decode_cart, encode_cart, format_item_summary, validate_product_fields,
    },
    models::{CartLine, CartTotals, LoadOutcome, Mutation, MutationKind, Product},
};
use crate::error::{CartError, MirrorError, PersistenceWarning, StorageError};
use crate::storage::CartStorage;

/// Storage key of the cart mirror.
pub const CART_STORAGE_KEY: &str = "cart";

/// The authoritative cart for one session.
pub struct CartStore<S: CartStorage> {
    lines: Vec<CartLine>,
    storage: S,
    key: String,
    load_outcome: LoadOutcome,
}

impl<S: CartStorage> CartStore<S> {
    /// Opens the cart stored under [`CART_STORAGE_KEY`].
    pub fn open(storage: S) -> Self {
        Self::open_with_key(storage, CART_STORAGE_KEY)
    }

    /// Opens the cart stored under `key`, reading the mirror once.
    ///
    /// A missing, unreadable or invalid mirror yields an empty cart.
    pub fn open_with_key(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let (lines, load_outcome) = match storage.load(&key) {
            Ok(None) => (Vec::new(), LoadOutcome::Empty),
            Ok(Some(raw)) => match decode_cart(&raw) {
                Ok(lines) if lines.is_empty() => (lines, LoadOutcome::Empty),
                Ok(lines) => {
                    let restored = lines.len();
                    tracing::debug!(%key, lines = restored, "restored cart from storage");
                    (lines, LoadOutcome::Restored { lines: restored })
                }
                Err(e) => {
                    tracing::warn!(%key, reason = %e, "discarding stored cart");
                    (Vec::new(), LoadOutcome::Discarded { reason: e.to_string() })
                }
            },
            Err(e) => {
                let warning = PersistenceWarning::new("load", &e);
                tracing::warn!(%key, operation = "load", error = %e, "cart storage read failed");
                (Vec::new(), LoadOutcome::Failed { warning })
            }
        };

        Self {
            lines,
            storage,
            key,
            load_outcome,
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Item count and total amount of the committed cart.
    pub fn totals(&self) -> CartTotals {
        compute_totals(&self.lines)
    }

    /// Adds one unit of `product`, creating the line on first add.
    ///
    /// `stock_limit` is the live stock figure; on success it becomes the
    /// line's new stock snapshot.
    pub fn add(&mut self, product: &Product, stock_limit: u32) -> Result<Mutation, CartError> {
        // Anything the loader would reject must never be committed.
        validate_product_fields(&product.id, product.price).map_err(|e| match e {
            MirrorError::EmptyProductId => CartError::EmptyProductId,
            _ => CartError::InvalidPrice {
                product_id: product.id.clone(),
            },
        })?;

        let mut next = self.lines.clone();
        let kind = match next.iter().position(|l| l.product_id == product.id) {
            Some(idx) => {
                let existing = &mut next[idx];
                let requested = existing.quantity.saturating_add(1);
                if requested > stock_limit {
                    return Err(CartError::StockExceeded {
                        product_id: product.id.clone(),
                        requested,
                        stock_limit,
                    });
                }
                existing.quantity = requested;
                existing.stock_limit = stock_limit;
                MutationKind::Incremented {
                    quantity: requested,
                }
            }
            None => {
                if stock_limit == 0 {
                    return Err(CartError::OutOfStock {
                        product_id: product.id.clone(),
                    });
                }
                next.push(CartLine::from_product(product, stock_limit));
                MutationKind::Added
            }
        };

        Ok(self.commit(next, kind))
    }

    /// Deletes the line for `product_id`; absent lines are a no-op.
    pub fn remove(&mut self, product_id: &str) -> Mutation {
        if self.line(product_id).is_none() {
            return Mutation::unchanged();
        }
        let next = self
            .lines
            .iter()
            .filter(|l| l.product_id != product_id)
            .cloned()
            .collect();
        self.commit(next, MutationKind::Removed)
    }

    /// Sets the quantity of an existing line.
    ///
    /// Quantities below 1 and above the line's stock snapshot are rejected and
    /// leave the prior quantity in place. Unknown products are a no-op.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> Result<Mutation, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let mut next = self.lines.clone();
        let Some(line) = next.iter_mut().find(|l| l.product_id == product_id) else {
            return Ok(Mutation::unchanged());
        };

        let requested = u32::try_from(quantity).unwrap_or(u32::MAX);
        if requested > line.stock_limit {
            return Err(CartError::StockExceeded {
                product_id: product_id.to_string(),
                requested,
                stock_limit: line.stock_limit,
            });
        }
        if requested == line.quantity {
            return Ok(Mutation::unchanged());
        }
        line.quantity = requested;

        Ok(self.commit(
            next,
            MutationKind::QuantitySet {
                quantity: requested,
            },
        ))
    }

    /// Empties the cart and deletes the durable mirror.
    pub fn clear(&mut self) -> Mutation {
        self.lines.clear();
        let warning = self
            .storage
            .remove(&self.key)
            .err()
            .map(|e| self.warn("remove", &e));
        Mutation {
            kind: MutationKind::Cleared,
            warning,
        }
    }

    /// Builds the order hand-off for the current cart and then clears it.
    ///
    /// Returns `None` for an empty cart, in which case nothing is written.
    pub fn checkout(&mut self, recipient: &str) -> Option<(OrderHandoff, Mutation)> {
        if self.lines.is_empty() {
            return None;
        }
        let handoff = build_handoff(&self.lines, &self.totals(), recipient);
        tracing::info!(
            key = %self.key,
            summary = %format_item_summary(&self.lines),
            "order handed off"
        );
        let mutation = self.clear();
        Some((handoff, mutation))
    }

    /// Replaces the committed lines and re-serializes the whole cart.
    fn commit(&mut self, next: Vec<CartLine>, kind: MutationKind) -> Mutation {
        self.lines = next;
        let warning = self.sync().err().map(|e| self.warn("save", &e));
        Mutation { kind, warning }
    }

    fn sync(&self) -> Result<(), StorageError> {
        let raw = encode_cart(&self.lines)?;
        self.storage.save(&self.key, &raw)
    }

    fn warn(&self, operation: &'static str, error: &StorageError) -> PersistenceWarning {
        tracing::warn!(key = %self.key, operation, error = %error, "cart storage write failed");
        PersistenceWarning::new(operation, error)
    }
}
