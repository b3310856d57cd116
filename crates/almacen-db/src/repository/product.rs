//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! Stock changes never happen alone: `adjust_stock` writes the new level
//! and appends the ledger movement in one transaction, so catalog and
//! ledger cannot disagree.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::repository::movement::{insert_movement, NewMovement};
use crate::repository::{decimal_col, money_col, new_id};
use almacen_core::{clamped_stock, Category, MovementKind, Product, ProductDraft, StockMovement, Unit};

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw `products` row. Mapped into [`Product`] before leaving this crate.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    category: Category,
    unit: Unit,
    cost_price: String,
    sell_price: String,
    stock: String,
    min_stock: String,
}

impl ProductRow {
    fn into_domain(self) -> StoreResult<Product> {
        Ok(Product {
            cost_price: money_col("cost_price", &self.cost_price)?,
            sell_price: money_col("sell_price", &self.sell_price)?,
            stock: decimal_col("stock", &self.stock)?,
            min_stock: decimal_col("min_stock", &self.min_stock)?,
            id: self.id,
            name: self.name,
            category: self.category,
            unit: self.unit,
        })
    }
}

/// Result of a stock adjustment: the new level plus the ledger entry.
#[derive(Debug, Clone)]
pub struct StockAdjustment {
    pub stock: Decimal,
    pub movement: StockMovement,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists all products, sorted by name.
    pub async fn list(&self) -> StoreResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, name, category, unit, cost_price, sell_price, stock, min_stock
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Loaded products");
        rows.into_iter().map(ProductRow::into_domain).collect()
    }

    /// Gets a product by its id.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, name, category, unit, cost_price, sell_price, stock, min_stock
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProductRow::into_domain).transpose()
    }

    /// Inserts a new product, assigning its id.
    pub async fn insert(&self, draft: &ProductDraft) -> StoreResult<Product> {
        let id = new_id();
        debug!(id = %id, name = %draft.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, category, unit, cost_price, sell_price, stock, min_stock)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&id)
        .bind(&draft.name)
        .bind(draft.category)
        .bind(draft.unit)
        .bind(draft.cost_price.amount().to_string())
        .bind(draft.sell_price.amount().to_string())
        .bind(draft.stock.to_string())
        .bind(draft.min_stock.to_string())
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id,
            name: draft.name.clone(),
            category: draft.category,
            unit: draft.unit,
            cost_price: draft.cost_price,
            sell_price: draft.sell_price,
            stock: draft.stock,
            min_stock: draft.min_stock,
        })
    }

    /// Replaces the full record matched by the product's id.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(StoreError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> StoreResult<()> {
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category = ?3,
                unit = ?4,
                cost_price = ?5,
                sell_price = ?6,
                stock = ?7,
                min_stock = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.category)
        .bind(product.unit)
        .bind(product.cost_price.amount().to_string())
        .bind(product.sell_price.amount().to_string())
        .bind(product.stock.to_string())
        .bind(product.min_stock.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Applies a signed stock delta and appends the ledger movement, in one
    /// transaction.
    ///
    /// The new level is `max(0, stock + delta)`; the movement records the
    /// requested delta verbatim, not the clamped one.
    ///
    /// ## Returns
    /// * `Ok(StockAdjustment)` - New stock level and the appended movement
    /// * `Err(StoreError::NotFound)` - Product doesn't exist; nothing written
    pub async fn adjust_stock(
        &self,
        id: &str,
        delta: Decimal,
        kind: MovementKind,
        reason: &str,
    ) -> StoreResult<StockAdjustment> {
        debug!(id = %id, delta = %delta, ?kind, "Adjusting stock");

        let mut tx = self.pool.begin().await?;

        let row: Option<(String,)> = sqlx::query_as("SELECT stock FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some((raw,)) = row else {
            return Err(StoreError::not_found("Product", id));
        };

        let current = decimal_col("stock", &raw)?;
        let stock = clamped_stock(current, delta);

        sqlx::query("UPDATE products SET stock = ?2 WHERE id = ?1")
            .bind(id)
            .bind(stock.to_string())
            .execute(&mut *tx)
            .await?;

        let movement = insert_movement(
            &mut tx,
            NewMovement {
                product_id: id,
                kind,
                quantity: delta,
                reason: Some(reason),
                at: Utc::now(),
            },
        )
        .await?;

        tx.commit().await?;

        Ok(StockAdjustment { stock, movement })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{DataStore, DbConfig};
    use almacen_core::Money;

    fn draft(name: &str, stock: i64) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            category: Category::Limpieza,
            unit: Unit::Unidad,
            cost_price: Money::from_major(1500),
            sell_price: Money::from_major(2400),
            stock: Decimal::from(stock),
            min_stock: Decimal::from(5),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let store = DataStore::new(DbConfig::in_memory()).await.unwrap();

        let product = store
            .products()
            .insert(&draft("Jabón en polvo Skip 800g", 4))
            .await
            .unwrap();

        let fetched = store.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Jabón en polvo Skip 800g");
        assert_eq!(fetched.category, Category::Limpieza);
        assert_eq!(fetched.sell_price, Money::from_major(2400));
        assert_eq!(fetched.stock, Decimal::from(4));
    }

    #[tokio::test]
    async fn test_get_unknown_is_none() {
        let store = DataStore::new(DbConfig::in_memory()).await.unwrap();
        assert!(store.products().get_by_id("p99").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_replaces_full_record() {
        let store = DataStore::new(DbConfig::in_memory()).await.unwrap();
        let mut product = store.products().insert(&draft("Lavandina 1L", 8)).await.unwrap();

        product.sell_price = Money::from_major(750);
        product.min_stock = Decimal::from(4);
        store.products().update(&product).await.unwrap();

        let fetched = store.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.sell_price, Money::from_major(750));
        assert_eq!(fetched.min_stock, Decimal::from(4));
    }

    #[tokio::test]
    async fn test_update_unknown_is_not_found() {
        let store = DataStore::new(DbConfig::in_memory()).await.unwrap();
        let mut product = store.products().insert(&draft("Detergente 500ml", 10)).await.unwrap();
        product.id = "p99".to_string();

        let err = store.products().update(&product).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_adjust_stock_clamps_but_records_requested_delta() {
        let store = DataStore::new(DbConfig::in_memory()).await.unwrap();
        let product = store.products().insert(&draft("Jabón en polvo Skip 800g", 4)).await.unwrap();

        let adjustment = store
            .products()
            .adjust_stock(&product.id, Decimal::from(-5), MovementKind::Ajuste, "Rotura")
            .await
            .unwrap();

        // Level clamps at zero, ledger keeps the requested -5
        assert_eq!(adjustment.stock, Decimal::ZERO);
        assert_eq!(adjustment.movement.quantity, Decimal::from(-5));
        assert_eq!(adjustment.movement.kind, MovementKind::Ajuste);
        assert_eq!(adjustment.movement.reason.as_deref(), Some("Rotura"));

        let fetched = store.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.stock, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_adjust_stock_unknown_writes_nothing() {
        let store = DataStore::new(DbConfig::in_memory()).await.unwrap();

        let err = store
            .products()
            .adjust_stock("p99", Decimal::from(3), MovementKind::Ingreso, "Reposición")
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(store.movements().list().await.unwrap().is_empty());
    }
}
