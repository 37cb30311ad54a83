//! API error handling
//!
//! Every error leaves the service as `{ "success": false, "error": ..., "details"?: [...] }`.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// Message used for every validation failure
pub const INVALID_REQUEST_DATA: &str = "Invalid request data";

/// Message for writes the catalog schema rejects
pub const CONSTRAINT_VIOLATION: &str = "Request conflicts with catalog data";

/// API error
#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // Request Errors
    // =========================================================================
    #[error("Invalid request data")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("Agent is not active")]
    AgentInactive,

    #[error("Too many requests, please try again later")]
    TooManyRequests { retry_after: u64 },

    // =========================================================================
    // Resource Errors
    // =========================================================================
    #[error("{0}")]
    NotFound(String),

    #[error("Agent not found")]
    AgentNotFound,

    #[error("Transaction not found")]
    TransactionNotFound,

    // =========================================================================
    // System Errors
    // =========================================================================
    /// Public message only; the cause is logged where it happened
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    /// Single-field validation failure
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError {
            field: field.into(),
            message: message.into(),
        }])
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) | Self::AgentInactive => {
                StatusCode::BAD_REQUEST
            }
            Self::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::NotFound(_) | Self::AgentNotFound | Self::TransactionNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// One rejected field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Human-readable error message
    pub error: String,
    /// Field-level detail for validation failures
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldError>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        let details = match err {
            ApiError::Validation(fields) => fields.clone(),
            _ => Vec::new(),
        };
        Self {
            success: false,
            error: err.to_string(),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = ErrorResponse::from(&self);

        let mut response = (status, Json(error_response)).into_response();

        if let ApiError::TooManyRequests { retry_after } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        }

        response
    }
}

/// Map a data-layer failure to a 500 carrying only `message`, logging the cause
pub fn db_failure(message: &'static str) -> impl FnOnce(agentmarket_db::DbError) -> ApiError {
    move |err| {
        tracing::error!(error = %err, "{}", message);
        ApiError::Internal(message)
    }
}

impl From<agentmarket_db::DbError> for ApiError {
    fn from(err: agentmarket_db::DbError) -> Self {
        use agentmarket_db::DbError;
        match err {
            DbError::NotFound(msg) => Self::NotFound(format!("{} not found", msg)),
            DbError::InvalidInput(msg) => Self::BadRequest(msg),
            DbError::Constraint(msg) => {
                tracing::warn!(error = %msg, "Catalog constraint violation");
                Self::BadRequest(CONSTRAINT_VIOLATION.to_string())
            }
            other => {
                tracing::error!(error = ?other, "Database error");
                Self::Internal("Internal server error")
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| FieldError {
                    field: camel_case(field),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("failed {} check", e.code)),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        Self::Validation(fields)
    }
}

/// Validation reports Rust field names; clients see the camelCase wire names
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
