//! Error handling for the Warehouse Stock Management Platform
//!
//! Every error kind maps to a stable machine-readable code and an HTTP
//! status; transfer validation failures surface before any ledger side
//! effect takes place.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::StockError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // Authorization-scope errors
    #[error("Warehouse {warehouse_code} of company {company_code} is not in the caller's authorized scope")]
    WarehouseNotAuthorized {
        company_code: String,
        warehouse_code: String,
    },

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Ledger errors
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock {
        requested: Decimal,
        available: Decimal,
    },

    #[error("Invalid reservation: {0}")]
    InvalidReservation(String),

    #[error("Stock adjustment rejected: {0}")]
    NegativeStock(String),

    // Transfer errors
    #[error("Article {article_code} is not allergen-compatible with location {location_code}")]
    AllergenIncompatible {
        article_code: String,
        location_code: String,
    },

    #[error("Pallet {pallet_id} cannot receive stock ({status})")]
    PalletNotReceiving { pallet_id: String, status: String },

    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<StockError> for AppError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::Insufficient {
                requested,
                available,
            } => AppError::InsufficientStock {
                requested,
                available,
            },
            StockError::InvalidReservation { .. } => AppError::InvalidReservation(err.to_string()),
            StockError::NegativeStock { .. } => AppError::NegativeStock(err.to_string()),
            StockError::NonPositiveQuantity(qty) => {
                AppError::InvalidQuantity(format!("quantity must be positive, got {}", qty))
            }
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    /// Stable machine-readable code for this error kind
    pub fn code(&self) -> &'static str {
        match self {
            AppError::TokenExpired => "TOKEN_EXPIRED",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::WarehouseNotAuthorized { .. } => "WAREHOUSE_NOT_AUTHORIZED",
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::InvalidQuantity(_) => "INVALID_QUANTITY",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            AppError::InvalidReservation(_) => "INVALID_RESERVATION",
            AppError::NegativeStock(_) => "NEGATIVE_STOCK",
            AppError::AllergenIncompatible { .. } => "ALLERGEN_INCOMPATIBLE",
            AppError::PalletNotReceiving { .. } => "PALLET_NOT_RECEIVING",
            AppError::TransferFailed(_) => "TRANSFER_FAILED",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Internal(_) | AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::TokenExpired | AppError::InvalidToken | AppError::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::WarehouseNotAuthorized { .. } => StatusCode::FORBIDDEN,
            AppError::Validation { .. } | AppError::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientStock { .. }
            | AppError::InvalidReservation(_)
            | AppError::NegativeStock(_)
            | AppError::AllergenIncompatible { .. }
            | AppError::PalletNotReceiving { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::TransferFailed(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::Internal(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let field = match &self {
            AppError::Validation { field, .. } => Some(field.clone()),
            _ => None,
        };
        let message = match &self {
            // Do not leak database details to callers
            AppError::DatabaseError(_) => "A database error occurred".to_string(),
            AppError::InternalError(_) => "An internal server error occurred".to_string(),
            other => other.to_string(),
        };

        let status = self.status();
        let detail = ErrorDetail {
            code: self.code().to_string(),
            message,
            field,
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
