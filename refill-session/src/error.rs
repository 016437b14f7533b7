//! Error types for the purchase session.
//!
//! Only the UI boundary can fail: catalog lookups, amount validation, route
//! parameters, configuration and opening the store. Saving, loading, the
//! reset signal and the terms gate are total.

use refill_storage::StorageError;
use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors raised at the boundary of the purchase session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Product id is not in the catalog.
    #[error("unknown product: {0}")]
    UnknownProduct(String),

    /// Amount is not one of the product's published options.
    #[error("amount {amount} is not offered for product {product_id}")]
    AmountNotOffered { product_id: String, amount: f64 },

    /// Amount is not a positive finite number.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Navigation parameters are missing or malformed.
    #[error("invalid navigation params: {0}")]
    InvalidParams(String),

    /// Catalog data could not be read or parsed.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Configuration could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// The storage medium could not be opened.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// Get a machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            SessionError::UnknownProduct(_) => "UNKNOWN_PRODUCT",
            SessionError::AmountNotOffered { .. } => "AMOUNT_NOT_OFFERED",
            SessionError::InvalidAmount(_) => "INVALID_AMOUNT",
            SessionError::InvalidParams(_) => "INVALID_PARAMS",
            SessionError::Catalog(_) => "CATALOG_ERROR",
            SessionError::Config(_) => "CONFIG_ERROR",
            SessionError::Storage(_) => "STORAGE_ERROR",
        }
    }
}
