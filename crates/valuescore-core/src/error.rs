use thiserror::Error;

use crate::provider::FetchError;

/// Validation and contract errors exposed by `valuescore-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter or digit: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("unknown metric field '{value}'")]
    UnknownField { value: String },
    #[error("field '{field}' of '{symbol}' must be a finite number or null")]
    NonNumericField { symbol: String, field: &'static str },

    #[error("score {value} is outside 0..=15")]
    InvalidScore { value: u8 },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("invalid value '{value}' for {key}")]
    InvalidConfig { key: &'static str, value: String },

    #[error("invalid metrics document: {reason}")]
    InvalidDocument { reason: String },
    #[error("duplicate symbol '{symbol}' in metrics document")]
    DuplicateSymbol { symbol: String },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
