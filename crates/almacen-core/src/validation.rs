//! # Validation Module
//!
//! Precondition checks run before any persistence attempt.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Service operation (Rust)                                     │
//! │  └── THIS MODULE: field and precondition checks, before I/O            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::ProductDraft;
use rust_decimal::Decimal;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length accepted for names.
const MAX_NAME_LEN: usize = 200;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a display name (product or client).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates that a monetary amount is not negative.
pub fn validate_money_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates that a payment amount is strictly positive.
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::NotPositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

/// Validates that a stock-like quantity is not negative.
pub fn validate_quantity_non_negative(field: &str, quantity: Decimal) -> ValidationResult<()> {
    if quantity < Decimal::ZERO {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates a product draft before it is created or applied as an update.
pub fn validate_product_draft(draft: &ProductDraft) -> ValidationResult<()> {
    validate_name("name", &draft.name)?;
    validate_money_non_negative("costPrice", draft.cost_price)?;
    validate_money_non_negative("sellPrice", draft.sell_price)?;
    validate_quantity_non_negative("stock", draft.stock)?;
    validate_quantity_non_negative("minStock", draft.min_stock)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
