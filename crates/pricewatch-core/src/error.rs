use thiserror::Error;

use crate::validation::InvalidReason;

/// Validation and contract errors exposed by `pricewatch-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unsupported asset '{value}'")]
    UnsupportedAsset { value: String },

    #[error("{reason}")]
    InvalidAddress { reason: InvalidReason },

    #[error("timestamp must be RFC3339 or epoch milliseconds: '{value}'")]
    InvalidTimestamp { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
}

/// Errors raised while assembling a [`ClientConfig`](crate::ClientConfig).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("api base url cannot be empty")]
    EmptyBaseUrl,

    #[error("api base url must start with http:// or https://: '{value}'")]
    InvalidBaseUrl { value: String },

    #[error("invalid timeout '{value}', expected a positive number of milliseconds")]
    InvalidTimeout { value: String },
}
