//! Error types for hsk-srs-core.

use thiserror::Error;

/// Result type alias using StoreError.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by review state stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Errors that can occur while loading a vocabulary catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid catalog json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("missing {field} for item {index}")]
    MissingField { index: usize, field: &'static str },

    #[error("duplicate item {key} at index {index}")]
    DuplicateKey { key: String, index: usize },

    #[error("empty catalog")]
    Empty,
}

/// Unrecognized grade name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown performance: {0}")]
pub struct ParsePerformanceError(pub String);
