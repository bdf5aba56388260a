//! # Engine Error Types
//!
//! Error types for the two storage-facing components and the caller
//! boundary.
//!
//! ## Translation Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Translation                                    │
//! │                                                                         │
//! │  StockError / LedgerError        (component failures, structured)      │
//! │       │                                                                 │
//! │       ▼  PurchaseEngine / CatalogService                                │
//! │  VendError                       (caller-facing categories + message)  │
//! │       │                                                                 │
//! │       ▼  surrounding service                                            │
//! │  HTTP status or equivalent       (404 / 403 / 400 / 500)               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing below `VendError` leaks past the engine: the orchestrator
//! catches every component error and either translates it into one of the
//! four categories or wraps it as `Internal`.

use serde::Serialize;
use thiserror::Error;
use vendo_db::DbError;
use vendo_core::{CoreError, ValidationError};

// =============================================================================
// Component Errors
// =============================================================================

/// Failures raised by a stock reservation component.
#[derive(Debug, Error)]
pub enum StockError {
    /// No product with the given id.
    #[error("Product not found: {0}")]
    NotFound(String),

    /// Fewer units available than requested. Carries the availability
    /// observed at decision time so the caller can say how many are left.
    #[error("Insufficient stock: only {available} available")]
    Insufficient { available: i64 },

    /// Unexpected storage failure.
    #[error("Stock storage error: {0}")]
    Storage(#[from] DbError),
}

/// Failures raised by a balance ledger component.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No account with the given id.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Balance does not cover the debit. Carries how many cents are
    /// missing.
    #[error("Insufficient balance: {shortfall} cents short")]
    Insufficient { shortfall: i64 },

    /// Unexpected storage failure.
    #[error("Ledger storage error: {0}")]
    Storage(#[from] DbError),
}

// =============================================================================
// Caller-Facing Error
// =============================================================================

/// Machine-readable category for a [`VendError`].
///
/// Maps one-to-one onto the HTTP status the surrounding service would
/// answer with, without this crate knowing anything about HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Referenced entity does not exist (404).
    NotFound,

    /// Request is valid but the domain refuses it (403):
    /// not enough stock, not enough balance.
    Forbidden,

    /// Input failed validation (400).
    BadRequest,

    /// Unexpected failure, treated as fatal by the caller (500).
    Internal,
}

/// Error returned across the engine boundary.
///
/// Each variant is a category; the payload is the human-readable message
/// the surrounding service forwards to the user. Insufficiency messages
/// always carry the numbers the buyer needs (available count, shortfall).
#[derive(Debug, Error)]
pub enum VendError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VendError {
    /// Returns the machine-readable category.
    pub fn code(&self) -> ErrorCode {
        match self {
            VendError::NotFound(_) => ErrorCode::NotFound,
            VendError::Forbidden(_) => ErrorCode::Forbidden,
            VendError::BadRequest(_) => ErrorCode::BadRequest,
            VendError::Internal(_) => ErrorCode::Internal,
        }
    }
}

/// Validation failures are always the caller's fault.
impl From<ValidationError> for VendError {
    fn from(err: ValidationError) -> Self {
        VendError::BadRequest(err.to_string())
    }
}

/// Core errors other than validation indicate broken invariants, which
/// the caller can only treat as internal failures.
impl From<CoreError> for VendError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            CoreError::UnrepresentableChange { .. } => VendError::Internal(err.to_string()),
        }
    }
}

/// Storage errors reaching the boundary directly (catalogue CRUD).
///
/// The purchase path never uses this blanket mapping; it translates
/// component errors explicitly so the messages carry request context.
impl From<DbError> for VendError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                VendError::NotFound(format!("{} not found: {}", entity, id))
            }
            other => VendError::Internal(other.to_string()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            VendError::NotFound("x".into()).code(),
            ErrorCode::NotFound
        );
        assert_eq!(
            VendError::Forbidden("x".into()).code(),
            ErrorCode::Forbidden
        );
        assert_eq!(
            VendError::BadRequest("x".into()).code(),
            ErrorCode::BadRequest
        );
        assert_eq!(
            VendError::Internal("x".into()).code(),
            ErrorCode::Internal
        );
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err: VendError = ValidationError::NotADenomination { cents: 7 }.into();
        assert_eq!(err.code(), ErrorCode::BadRequest);
        assert!(err.to_string().contains("not an accepted coin"));
    }

    #[test]
    fn test_db_not_found_maps_to_not_found() {
        let err: VendError = DbError::not_found("Product", "p-1").into();
        assert_eq!(err.code(), ErrorCode::NotFound);

        let err: VendError = DbError::QueryFailed("boom".into()).into();
        assert_eq!(err.code(), ErrorCode::Internal);
    }

    #[test]
    fn test_error_code_serializes_screaming() {
        let json = serde_json::to_string(&ErrorCode::BadRequest).unwrap();
        assert_eq!(json, "\"BAD_REQUEST\"");
    }
}
