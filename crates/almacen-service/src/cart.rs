//! # Cart Operations
//!
//! Service surface over the session cart.
//!
//! The cart itself ([`almacen_core::Cart`]) is pure and total; the only
//! fallible step here is resolving a product id against the catalog
//! mirror. None of these operations touch the data store or stock.

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::ServiceResult;
use crate::StoreService;
use almacen_core::CoreError;

impl StoreService {
    /// Adds one unit of a product to the cart.
    ///
    /// If the product already has a line its quantity is incremented by 1.
    pub fn add_to_cart(&self, product_id: &str) -> ServiceResult<()> {
        debug!(product_id = %product_id, "add_to_cart");

        let product = self
            .product(product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        self.cart.with_cart_mut(|c| c.add(&product));
        Ok(())
    }

    /// Removes a product's line from the cart, if present.
    pub fn remove_from_cart(&self, product_id: &str) {
        debug!(product_id = %product_id, "remove_from_cart");
        self.cart.with_cart_mut(|c| c.remove(product_id));
    }

    /// Replaces a line's quantity; a quantity ≤ 0 removes the line.
    pub fn set_cart_quantity(&self, product_id: &str, quantity: Decimal) {
        debug!(product_id = %product_id, quantity = %quantity, "set_cart_quantity");
        self.cart.with_cart_mut(|c| c.set_quantity(product_id, quantity));
    }

    /// Empties the cart without committing anything.
    ///
    /// Used when the customer walks away; an abandoned cart leaves no
    /// trace anywhere.
    pub fn clear_cart(&self) {
        debug!("clear_cart");
        self.cart.with_cart_mut(|c| c.clear());
    }
}
