//! # Error Types
//!
//! Domain-specific error types for vendo-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vendo-core errors (this file)                                         │
//! │  ├── CoreError        - Domain logic failures                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vendo-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  vendo-engine errors (separate crate)                                  │
//! │  ├── StockError       - Stock reservation failures                     │
//! │  ├── LedgerError      - Balance ledger failures                        │
//! │  └── VendError        - What the caller boundary sees                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StockError/LedgerError → VendError│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (amounts, ids)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent broken domain invariants. They should never
/// occur in a correctly composed system; when they do, something outside
/// this crate has violated a rule this crate relies on.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Change amount cannot be expressed with the machine's coins.
    ///
    /// ## When This Occurs
    /// Balances are sums of valid denominations and product costs are
    /// multiples of 5, so every remainder is representable. Seeing this
    /// error means stored data was corrupted or an invariant was bypassed.
    /// It must fail loudly, never be truncated to the nearest coin.
    #[error("Change of {cents} cents cannot be represented with coins of 5/10/20/50/100")]
    UnrepresentableChange { cents: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before any storage access runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// A coin value outside the accepted denomination set.
    #[error("{cents} is not an accepted coin; allowed denominations are 5, 10, 20, 50 and 100 cents")]
    NotADenomination { cents: i64 },

    /// A product cost that would make exact change impossible.
    #[error("Product cost of {cents} cents must be a multiple of 5 so the buyer always gets full change")]
    NotMultipleOfFive { cents: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::UnrepresentableChange { cents: 3 };
        assert_eq!(
            err.to_string(),
            "Change of 3 cents cannot be represented with coins of 5/10/20/50/100"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::NotADenomination { cents: 7 };
        assert!(err.to_string().contains("7 is not an accepted coin"));

        let err = ValidationError::NotMultipleOfFive { cents: 101 };
        assert!(err.to_string().contains("multiple of 5"));
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
