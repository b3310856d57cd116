//! # Domain Types
//!
//! Core domain types for the Almacén system.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │     Client      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  category/unit  │   │  items (frozen) │   │  debt           │       │
//! │  │  stock ≥ 0      │   │  total          │   │  purchases[]    │       │
//! │  │  sell_price     │   │  payment_method │   │  payments[]     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │  StockMovement  │   │  PaymentMethod  │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  append-only    │   │  Efectivo       │                             │
//! │  │  signed qty     │   │  Transferencia  │                             │
//! │  │  kind + reason  │   │  Tarjeta        │                             │
//! │  └─────────────────┘   │  Fiado          │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sale items freeze the product name and unit price at sale time, so
//! historical sales never shift when the catalog is edited later.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// Product category. Fixed set; the store does not define its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum Category {
    Bebidas,
    #[serde(rename = "Lácteos")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Lácteos"))]
    Lacteos,
    #[serde(rename = "Almacén")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Almacén"))]
    Almacen,
    Limpieza,
    Golosinas,
    #[serde(rename = "Fiambrería")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Fiambrería"))]
    Fiambreria,
    #[serde(rename = "Panadería")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Panadería"))]
    Panaderia,
    #[serde(rename = "Verdulería")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Verdulería"))]
    Verduleria,
    Otros,
}

// =============================================================================
// Unit of Measure
// =============================================================================

/// Unit a product is sold in.
///
/// Discrete products sell in whole units; weighed and poured goods sell
/// in fractional kilograms or litres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Unidad,
    Kg,
    Litro,
}

impl Unit {
    /// Whether quantities of this unit may be fractional.
    #[inline]
    pub const fn allows_fraction(&self) -> bool {
        matches!(self, Unit::Kg | Unit::Litro)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid.
///
/// `Fiado` defers payment: the sale total is added to the client's debt
/// instead of being collected at the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Efectivo,
    Transferencia,
    Tarjeta,
    Fiado,
}

impl PaymentMethod {
    /// Whether this method defers payment onto a client's debt.
    #[inline]
    pub const fn is_fiado(&self) -> bool {
        matches!(self, PaymentMethod::Fiado)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
///
/// Stock is a non-negative decimal; fractional values occur for kg/litro
/// units. Products are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier, assigned by the data store.
    pub id: String,

    /// Display name shown at the counter and frozen into sale items.
    pub name: String,

    /// Category for grouping.
    pub category: Category,

    /// Unit the product is sold in.
    pub unit: Unit,

    /// What the store pays per unit.
    pub cost_price: Money,

    /// What the store charges per unit.
    pub sell_price: Money,

    /// Current stock level. Never negative.
    pub stock: Decimal,

    /// Threshold below which the product counts as low on stock.
    pub min_stock: Decimal,
}

impl Product {
    /// Whether the stock level has fallen to or below the minimum.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }

    /// Gross margin per unit (sell price minus cost price).
    #[inline]
    pub fn margin(&self) -> Money {
        self.sell_price - self.cost_price
    }
}

/// Payload for creating a product; the data store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub category: Category,
    pub unit: Unit,
    pub cost_price: Money,
    pub sell_price: Money,
    pub stock: Decimal,
    pub min_stock: Decimal,
}

/// Applies a signed stock delta, clamping the result at zero.
///
/// Overselling does not reject: a decrement past zero leaves the stock at
/// zero. Weighed goods are sold slightly imprecisely and the counter must
/// never block a sale over a bookkeeping fraction.
#[inline]
pub fn clamped_stock(current: Decimal, delta: Decimal) -> Decimal {
    let next = current + delta;
    if next < Decimal::ZERO {
        Decimal::ZERO
    } else {
        next
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A line item of a sale.
///
/// Freezes the product name and unit price at sale time; later catalog
/// edits never rewrite sale history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// Quantity sold; fractional for kg/litro products.
    pub quantity: Decimal,
    /// Unit price at time of sale (frozen).
    pub unit_price: Money,
    /// `quantity × unit_price`.
    pub subtotal: Money,
}

impl SaleItem {
    /// Builds a line item by snapshotting a product at the given quantity.
    pub fn snapshot(product: &Product, quantity: Decimal) -> Self {
        SaleItem {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity,
            unit_price: product.sell_price,
            subtotal: product.sell_price * quantity,
        }
    }
}

/// A committed sale. Immutable once created; there is no update or
/// delete operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// Unique identifier, assigned by the data store at persistence time.
    pub id: String,

    /// When the sale was committed.
    pub created_at: DateTime<Utc>,

    /// Ordered line items.
    pub items: Vec<SaleItem>,

    /// Sum of the item subtotals.
    pub total: Money,

    /// How the sale was paid.
    pub payment_method: PaymentMethod,

    /// The indebted client. Present exactly when `payment_method` is fiado.
    pub client_id: Option<String>,
}

/// Payload for committing a sale; id and timestamp are assigned by the
/// data store.
#[derive(Debug, Clone)]
pub struct SaleDraft {
    pub items: Vec<SaleItem>,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub client_id: Option<String>,
}

impl SaleDraft {
    /// Assembles a draft, deriving the total from the item subtotals.
    pub fn new(items: Vec<SaleItem>, payment_method: PaymentMethod, client_id: Option<String>) -> Self {
        let total = items.iter().map(|i| i.subtotal).sum();
        SaleDraft {
            items,
            total,
            payment_method,
            client_id,
        }
    }

    /// Joined item names, used as the detail line of a fiado purchase entry.
    pub fn detail(&self) -> String {
        self.items
            .iter()
            .map(|i| i.product_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// =============================================================================
// Stock Movement
// =============================================================================

/// Cause of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// Stock left the store through a sale.
    Venta,
    /// Manual correction (breakage, count mismatch).
    Ajuste,
    /// Goods arrived.
    Ingreso,
}

/// An immutable audit record of one stock change.
///
/// The quantity is the signed delta that was requested, recorded verbatim
/// even when the resulting stock level was clamped at zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    pub created_at: DateTime<Utc>,
    pub kind: MovementKind,
    /// Signed delta. Negative for sales and downward adjustments.
    pub quantity: Decimal,
    pub reason: Option<String>,
}

// =============================================================================
// Client
// =============================================================================

/// A purchase made on credit, appended to the client's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPurchase {
    pub date: DateTime<Utc>,
    pub amount: Money,
    /// Joined names of the purchased items.
    pub detail: String,
}

/// A payment towards a client's debt, appended to the client's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayment {
    pub date: DateTime<Utc>,
    pub amount: Money,
}

/// A client who may buy on credit.
///
/// `debt` only moves up through fiado sales and down through payments,
/// and is clamped at zero on payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub debt: Money,
    /// Append-only purchase history.
    pub purchases: Vec<ClientPurchase>,
    /// Append-only payment history.
    pub payments: Vec<ClientPayment>,
}

// =============================================================================
// Unit Tests
// =============================================================================
