//! # Catalog Operations
//!
//! Product creation, full-record updates and manual stock adjustments.
//!
//! Stock adjustments clamp at zero and always leave a ledger movement;
//! the movement records the requested delta verbatim, so the ledger shows
//! what was asked for even when the level bottomed out.

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::ServiceResult;
use crate::StoreService;
use almacen_core::validation::{
    validate_money_non_negative, validate_name, validate_product_draft,
    validate_quantity_non_negative,
};
use almacen_core::{CoreError, MovementKind, Product, ProductDraft};

/// Default reasons when the caller gives none, matching what the counter
/// staff would type.
const DEFAULT_RESTOCK_REASON: &str = "Ingreso de mercadería";
const DEFAULT_ADJUST_REASON: &str = "Ajuste de stock";

impl StoreService {
    /// Creates a product from a draft. The data store assigns the id.
    pub async fn create_product(&self, draft: &ProductDraft) -> ServiceResult<Product> {
        debug!(name = %draft.name, "create_product");
        validate_product_draft(draft)?;

        let product = self.store.products().insert(draft).await?;
        self.products.with_mut(|p| p.push(product.clone()));

        info!(id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Replaces the full product record matched by its id.
    ///
    /// There are no partial-field patch semantics: the given record wins
    /// wholesale.
    pub async fn update_product(&self, product: &Product) -> ServiceResult<()> {
        debug!(id = %product.id, "update_product");

        validate_name("name", &product.name)?;
        validate_money_non_negative("costPrice", product.cost_price)?;
        validate_money_non_negative("sellPrice", product.sell_price)?;
        validate_quantity_non_negative("stock", product.stock)?;
        validate_quantity_non_negative("minStock", product.min_stock)?;

        self.store.products().update(product).await?;

        self.products.with_mut(|products| {
            if let Some(p) = products.iter_mut().find(|p| p.id == product.id) {
                *p = product.clone();
            }
        });

        info!(id = %product.id, "Product updated");
        Ok(())
    }

    /// Applies a signed stock delta and appends the ledger movement.
    ///
    /// The new level is `max(0, stock + delta)`. The movement kind is
    /// `ingreso` for positive deltas and `ajuste` otherwise; when no
    /// reason is given a default one is supplied here.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Updated product snapshot
    /// * `Err(NotFound)` - Unknown product id; nothing written
    pub async fn adjust_stock(
        &self,
        product_id: &str,
        delta: Decimal,
        reason: Option<&str>,
    ) -> ServiceResult<Product> {
        debug!(product_id = %product_id, delta = %delta, "adjust_stock");

        let Some(mut product) = self.product(product_id) else {
            return Err(CoreError::ProductNotFound(product_id.to_string()).into());
        };

        let kind = if delta > Decimal::ZERO {
            MovementKind::Ingreso
        } else {
            MovementKind::Ajuste
        };
        let reason = reason.filter(|r| !r.trim().is_empty()).unwrap_or(match kind {
            MovementKind::Ingreso => DEFAULT_RESTOCK_REASON,
            _ => DEFAULT_ADJUST_REASON,
        });

        let adjustment = self
            .store
            .products()
            .adjust_stock(product_id, delta, kind, reason)
            .await?;

        product.stock = adjustment.stock;
        self.products.with_mut(|products| {
            if let Some(p) = products.iter_mut().find(|p| p.id == product_id) {
                p.stock = adjustment.stock;
            }
        });
        self.movements
            .with_mut(|m| m.push(adjustment.movement.clone()));

        info!(
            product_id = %product_id,
            delta = %delta,
            stock = %adjustment.stock,
            ?kind,
            "Stock adjusted"
        );
        Ok(product)
    }

    /// Products at or below their minimum stock threshold.
    pub fn low_stock_products(&self) -> Vec<Product> {
        self.products
            .with(|p| p.iter().filter(|x| x.is_low_stock()).cloned().collect())
    }
}
