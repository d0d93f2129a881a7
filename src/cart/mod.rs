//! Shopping Cart Domain Module
//!
//! This module contains all shopping cart business logic, including:
//! - Domain models (CartLine, Product, totals, mutation results)
//! - The durable mirror codec and invariant checks
//! - The cart store and its storage synchronization
//! - Order hand-off at checkout
//! - REST API handlers

pub mod checkout;
pub mod handlers;
pub mod helpers;
pub mod models;
pub mod state;

// Re-export commonly used types for convenience
pub use handlers::routes;
pub use models::{CartLine, CartTotals, LoadOutcome, Mutation, MutationKind, Product};
pub use state::{CartStore, CART_STORAGE_KEY};
