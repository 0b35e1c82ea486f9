//! Error types for the valuation engine

use crate::types::ModelKey;
use thiserror::Error;

/// Main error type for valuation operations
#[derive(Error, Debug)]
pub enum ValuationError {
    #[error("Invalid assumption for {model}: {field} = {value}")]
    InvalidAssumption {
        model: ModelKey,
        field: &'static str,
        value: f64,
    },

    #[error("Non-finite {quantity} computed by {model}")]
    NonFiniteValue {
        model: ModelKey,
        quantity: &'static str,
    },

    #[error("Unknown model key: {0}")]
    UnknownModel(String),

    #[error("Assumption store error: {0}")]
    StoreError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[cfg(feature = "rusqlite-support")]
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
}

/// Result type alias for valuation operations
pub type Result<T> = std::result::Result<T, ValuationError>;
