//! Purchase transaction status

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{TypesError, TypesResult};

/// Buyer recorded when a run carries no wallet address
pub const ANONYMOUS_BUYER: &str = "anonymous";

/// Chain hash recorded before the payment hash is known
pub const PENDING_TX_HASH: &str = "pending";

/// Lifecycle of a purchase transaction.
///
/// A transaction row is immutable once written except for this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether the transaction counts towards sales and volume
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = TypesError;

    fn from_str(s: &str) -> TypesResult<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(TypesError::InvalidTransactionStatus(other.to_string())),
        }
    }
}
