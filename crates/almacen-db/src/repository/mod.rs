//! # Repositories
//!
//! One repository per entity family. Each repository owns the SQL for its
//! tables and maps typed row structs into domain entities at this boundary;
//! nothing outside this module sees a raw row.

pub mod client;
pub mod movement;
pub mod product;
pub mod sale;

use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use almacen_core::Money;

/// Generates a new entity id.
///
/// Ids are assigned here, at persistence time; callers never supply them.
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Parses a decimal column stored as TEXT.
pub(crate) fn decimal_col(column: &str, raw: &str) -> StoreResult<Decimal> {
    Decimal::from_str(raw).map_err(|e| StoreError::decode(column, e.to_string()))
}

/// Parses a monetary column stored as TEXT.
pub(crate) fn money_col(column: &str, raw: &str) -> StoreResult<Money> {
    decimal_col(column, raw).map(Money::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_col_parses_fractions() {
        assert_eq!(decimal_col("stock", "0.5").unwrap(), Decimal::new(5, 1));
        assert_eq!(decimal_col("stock", "24").unwrap(), Decimal::from(24));
    }

    #[test]
    fn test_decimal_col_rejects_garbage() {
        let err = decimal_col("stock", "two dozen").unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }

    #[test]
    fn test_new_ids_are_unique() {
        assert_ne!(new_id(), new_id());
    }
}
