//! # Cart
//!
//! The transient working set of products a customer is about to buy.
//!
//! The cart exists only for the active checkout session: it has no
//! persistence and no error states. Every operation is a total function
//! over the in-memory line set, and the total is always derived from the
//! lines, never stored.
//!
//! ## Invariants
//! - Lines are unique by product id (adding the same product again
//!   increments its quantity).
//! - Every line quantity is > 0; setting a quantity ≤ 0 removes the line.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::Product;

/// One line of the cart: a product at a quantity.
///
/// The product is a clone taken when the line was added, so the cart
/// display stays consistent while the catalog is edited underneath it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product: Product,
    /// Always > 0. Fractional for kg/litro products.
    pub quantity: Decimal,
}

impl CartLine {
    /// Line subtotal: sell price × quantity.
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.product.sell_price * self.quantity
    }
}

/// The cart itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds one unit of a product.
    ///
    /// If the product already has a line its quantity is incremented by 1;
    /// otherwise a new line with quantity 1 is inserted. No effect on stock.
    pub fn add(&mut self, product: &Product) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product.id) {
            line.quantity += Decimal::ONE;
            return;
        }

        self.lines.push(CartLine {
            product: product.clone(),
            quantity: Decimal::ONE,
        });
    }

    /// Removes the line for a product, if present.
    pub fn remove(&mut self, product_id: &str) {
        self.lines.retain(|l| l.product.id != product_id);
    }

    /// Replaces a line's quantity.
    ///
    /// A quantity ≤ 0 removes the line instead of storing a non-positive
    /// value. Unknown product ids are ignored.
    pub fn set_quantity(&mut self, product_id: &str, quantity: Decimal) {
        if quantity <= Decimal::ZERO {
            self.remove(product_id);
            return;
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product_id) {
            line.quantity = quantity;
        }
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Current lines, in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Derived total: Σ sell price × quantity over all lines.
    pub fn total(&self) -> Money {
        self.lines.iter().map(|l| l.subtotal()).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
