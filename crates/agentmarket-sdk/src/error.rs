//! SDK errors

use std::time::Duration;

use agentmarket_types::TypesError;

/// SDK-specific errors
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid value: {0}")]
    InvalidValue(#[from] TypesError),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("RPC call {0} returned no result")]
    MissingResult(String),

    #[error("Please connect your wallet")]
    WalletNotConnected,

    #[error("Agent is not active")]
    AgentInactive,

    #[error("Payment {0} was reverted")]
    PaymentReverted(String),

    #[error("Payment {tx_hash} not confirmed after {waited:?}")]
    PaymentTimeout { tx_hash: String, waited: Duration },
}

impl SdkError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

/// SDK Result type
pub type SdkResult<T> = std::result::Result<T, SdkError>;
