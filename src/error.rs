//! Error taxonomy for the storefront state layer
//!
//! Domain-rule rejections (`CartError`) are returned to the caller and always
//! leave state untouched. Storage failures (`StorageError`) never surface as
//! errors from cart mutations; they are downgraded to a `PersistenceWarning`.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// A cart mutation that was rejected because it would break a cart invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The product has no stock available, so no line can be created.
    #[error("product {product_id} is out of stock")]
    OutOfStock { product_id: String },

    /// The requested quantity is above the stock snapshot of the line.
    #[error("quantity {requested} for product {product_id} exceeds available stock {stock_limit}")]
    StockExceeded {
        product_id: String,
        requested: u32,
        stock_limit: u32,
    },

    /// Quantities must be at least 1.
    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),

    /// The product price is negative or not a finite number.
    #[error("product {product_id} has an invalid price")]
    InvalidPrice { product_id: String },

    /// Lines are keyed by product id, so it cannot be empty.
    #[error("product id must not be empty")]
    EmptyProductId,
}

impl CartError {
    /// Stable machine-readable name, used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            CartError::OutOfStock { .. } => "OutOfStock",
            CartError::StockExceeded { .. } => "StockExceeded",
            CartError::InvalidQuantity(_) => "InvalidQuantity",
            CartError::InvalidPrice { .. } => "InvalidPrice",
            CartError::EmptyProductId => "EmptyProductId",
        }
    }
}

/// Failure of the durable key-value collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage quota exceeded: {needed} bytes requested, limit is {limit}")]
    QuotaExceeded { needed: usize, limit: usize },
}

/// Why a stored cart mirror was rejected on load.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("malformed cart mirror: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("line with empty product id")]
    EmptyProductId,

    #[error("product {product_id} has quantity 0")]
    ZeroQuantity { product_id: String },

    #[error("product {product_id} has quantity {quantity} above stock limit {stock_limit}")]
    AboveStockLimit {
        product_id: String,
        quantity: u32,
        stock_limit: u32,
    },

    #[error("product {product_id} has invalid unit price {unit_price}")]
    InvalidPrice { product_id: String, unit_price: f64 },

    #[error("duplicate line for product {product_id}")]
    DuplicateLine { product_id: String },
}

/// Non-fatal notice that the durable mirror could not be read or written.
///
/// The in-memory cart stays authoritative for the session when this occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistenceWarning {
    pub operation: &'static str,
    pub message: String,
}

impl PersistenceWarning {
    pub(crate) fn new(operation: &'static str, error: &StorageError) -> Self {
        Self {
            operation,
            message: error.to_string(),
        }
    }
}

/// An external query field that was malformed and replaced by its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeFallback {
    pub key: &'static str,
    pub raw: String,
}

/// Invalid process configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Failure loading the reference catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure building the application state at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
