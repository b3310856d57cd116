//! # Error Types
//!
//! Domain-specific error types for almacen-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  almacen-core errors (this file)                                       │
//! │  ├── CoreError        - Domain errors (unknown ids, rule violations)   │
//! │  └── ValidationError  - Precondition failures, caught before I/O       │
//! │                                                                         │
//! │  almacen-db errors (separate crate)                                    │
//! │  └── StoreError       - Backing-store operation failures               │
//! │                                                                         │
//! │  almacen-service errors                                                │
//! │  └── ServiceError     - What the UI collaborator sees                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → ServiceError → UI    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or references to
/// entities that do not exist. They are surfaced to the caller before
/// any partial mutation takes place.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id does not resolve to a known product.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Client id does not resolve to a known client.
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Precondition failures.
///
/// These occur when a caller violates an operation's contract. They must
/// be raised synchronously, before any persistence attempt.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    NotPositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Checkout was attempted with no items in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A fiado sale was attempted without a resolvable client.
    #[error("A client is required for a fiado sale")]
    MissingClient,
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
        let err = CoreError::ProductNotFound("p99".to_string());
        assert_eq!(err.to_string(), "Product not found: p99");

        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        assert_eq!(ValidationError::EmptyCart.to_string(), "Cart is empty");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MissingClient;
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
