//! Transaction DTOs

use agentmarket_db::DbTransaction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::common::validate_status;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    pub id: String,
    pub agent_id: String,
    pub buyer: String,
    pub amount: String,
    pub tx_hash: String,
    pub status: String,
    pub prompt: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

impl From<DbTransaction> for TransactionDto {
    fn from(tx: DbTransaction) -> Self {
        Self {
            id: tx.id,
            agent_id: tx.agent_id,
            buyer: tx.buyer,
            amount: tx.amount,
            tx_hash: tx.tx_hash,
            status: tx.status,
            prompt: tx.prompt,
            response: tx.response,
            timestamp: tx.timestamp,
        }
    }
}

/// Settle or fail a recorded transaction
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateTransactionStatusRequest {
    /// `pending`, `completed` or `failed`
    #[validate(custom(function = "validate_status"))]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    pub success: bool,
    pub transaction: TransactionDto,
}
