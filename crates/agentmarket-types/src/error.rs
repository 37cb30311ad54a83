//! Error types for domain parsing

use thiserror::Error;

/// Errors raised while parsing or validating domain values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypesError {
    #[error("Invalid agent type: {0}")]
    InvalidAgentType(String),

    #[error("Invalid transaction status: {0}")]
    InvalidTransactionStatus(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Rating must be between {min} and {max}, got {value}")]
    RatingOutOfRange { value: String, min: f64, max: f64 },
}

/// Result type for domain parsing
pub type TypesResult<T> = Result<T, TypesError>;
