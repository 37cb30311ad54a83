//! Transaction Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use agentmarket_types::TransactionStatus;

use crate::dto::{TransactionResponse, UpdateTransactionStatusRequest};
use crate::error::{ApiError, ApiResult};
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// Update a transaction's status once the chain outcome is known
#[utoipa::path(
    post,
    path = "/api/transaction/{id}/status",
    tag = "Transactions",
    params(("id" = String, Path, description = "Transaction id")),
    request_body = UpdateTransactionStatusRequest,
    responses(
        (status = 200, description = "Updated transaction", body = TransactionResponse),
        (status = 400, description = "Unknown status", body = crate::error::ErrorResponse),
        (status = 404, description = "Transaction not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_transaction_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateTransactionStatusRequest>,
) -> ApiResult<Json<TransactionResponse>> {
    let status: TransactionStatus = req
        .status
        .parse()
        .map_err(|_| ApiError::invalid_field("status", "must be one of: pending, completed, failed"))?;

    let transaction = state
        .db
        .transaction_repo()
        .update_status(&id, status)
        .await?
        .ok_or(ApiError::TransactionNotFound)?;

    tracing::info!(transaction_id = %transaction.id, status = %transaction.status, "Transaction status updated");

    Ok(Json(TransactionResponse {
        success: true,
        transaction: transaction.into(),
    }))
}
