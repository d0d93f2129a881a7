//! Product List Filter Module
//!
//! This module contains the filter, sort and pagination state of the product
//! list, including:
//! - Domain models (FilterCriteria, Brand, SortKey, partial updates)
//! - The URL query-string codec
//! - Query compilation for the product-listing collaborator
//! - State synchronized with the page location
//! - REST API handlers

pub mod codec;
pub mod handlers;
pub mod models;
pub mod query;
pub mod state;

// Re-export commonly used types for convenience
pub use codec::{decode, decode_with_report, encode};
pub use handlers::routes;
pub use models::{Brand, FilterCriteria, FilterUpdate, SortKey};
pub use query::{compile_query, Predicate, QueryDescription};
pub use state::{FilterQueryState, MemoryLocation, QueryLocation};
