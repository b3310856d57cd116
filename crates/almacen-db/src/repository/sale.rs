//! # Sale Repository
//!
//! Database operations for sales and their side effects.
//!
//! ## Sale Commit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    record_sale (one transaction)                        │
//! │                                                                         │
//! │  1. INSERT sales header            (id assigned here)                  │
//! │  2. INSERT sale_items              (frozen snapshots, ordered)         │
//! │  3. per item, in order:                                                │
//! │     ├── SELECT products.stock      (sees prior items' writes)          │
//! │     ├── UPDATE products.stock      (clamped at zero)                   │
//! │     └── INSERT stock_movements     (kind 'venta', -quantity)           │
//! │  4. fiado only:                                                        │
//! │     ├── UPDATE clients.debt        (+ total)                           │
//! │     └── INSERT client_purchases                                        │
//! │  5. COMMIT                                                             │
//! │                                                                         │
//! │  Any failure rolls the whole sale back; no partial sale is ever        │
//! │  visible in the store.                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales are immutable once committed: there is no update or delete.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::repository::client::{charge_credit, ClientCharge};
use crate::repository::movement::{insert_movement, NewMovement};
use crate::repository::{decimal_col, money_col, new_id};
use almacen_core::{
    clamped_stock, MovementKind, PaymentMethod, Sale, SaleDraft, SaleItem, StockMovement,
};

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw `sales` row, without items.
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    created_at: DateTime<Utc>,
    total: String,
    payment_method: PaymentMethod,
    client_id: Option<String>,
}

impl SaleRow {
    fn into_domain(self, items: Vec<SaleItem>) -> StoreResult<Sale> {
        Ok(Sale {
            total: money_col("total", &self.total)?,
            id: self.id,
            created_at: self.created_at,
            items,
            payment_method: self.payment_method,
            client_id: self.client_id,
        })
    }
}

/// Raw `sale_items` row.
#[derive(Debug, sqlx::FromRow)]
struct SaleItemRow {
    sale_id: String,
    product_id: String,
    product_name: String,
    quantity: String,
    unit_price: String,
    subtotal: String,
}

impl SaleItemRow {
    fn into_domain(self) -> StoreResult<(String, SaleItem)> {
        Ok((
            self.sale_id,
            SaleItem {
                quantity: decimal_col("quantity", &self.quantity)?,
                unit_price: money_col("unit_price", &self.unit_price)?,
                subtotal: money_col("subtotal", &self.subtotal)?,
                product_id: self.product_id,
                product_name: self.product_name,
            },
        ))
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// Stock level of one product after a sale commit.
#[derive(Debug, Clone)]
pub struct StockLevel {
    pub product_id: String,
    pub stock: Decimal,
}

/// Everything a committed sale changed, for the caller to fold into its
/// in-memory mirrors.
#[derive(Debug, Clone)]
pub struct SaleOutcome {
    pub sale: Sale,
    /// New stock level per sold product, in item order.
    pub stock_levels: Vec<StockLevel>,
    /// One `venta` ledger entry per item, in item order.
    pub movements: Vec<StockMovement>,
    /// The debt charge, for fiado sales only.
    pub charge: Option<ClientCharge>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Commits a sale and all of its side effects in one transaction.
    ///
    /// Assigns the sale id and timestamp. Per item, the current stock is
    /// re-read inside the transaction, so each step sees the level the
    /// previous step committed; the decrement clamps at zero while the
    /// ledger movement records the full `-quantity`.
    ///
    /// ## Returns
    /// * `Ok(SaleOutcome)` - The persisted sale and its effects
    /// * `Err(StoreError::NotFound)` - A product or the fiado client is
    ///   unknown; the whole sale is rolled back
    pub async fn record_sale(&self, draft: &SaleDraft) -> StoreResult<SaleOutcome> {
        let id = new_id();
        let now = Utc::now();

        debug!(id = %id, items = draft.items.len(), total = %draft.total, "Recording sale");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (id, created_at, total, payment_method, client_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&id)
        .bind(now)
        .bind(draft.total.amount().to_string())
        .bind(draft.payment_method)
        .bind(&draft.client_id)
        .execute(&mut *tx)
        .await?;

        for (position, item) in draft.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_items
                    (sale_id, position, product_id, product_name, quantity, unit_price, subtotal)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&id)
            .bind(position as i64)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity.to_string())
            .bind(item.unit_price.amount().to_string())
            .bind(item.subtotal.amount().to_string())
            .execute(&mut *tx)
            .await?;
        }

        // Stock effects, threading each item's committed result into the
        // next read instead of working from a pre-sale snapshot.
        let mut stock_levels = Vec::with_capacity(draft.items.len());
        let mut movements = Vec::with_capacity(draft.items.len());

        for item in &draft.items {
            let row: Option<(String,)> = sqlx::query_as("SELECT stock FROM products WHERE id = ?1")
                .bind(&item.product_id)
                .fetch_optional(&mut *tx)
                .await?;

            let Some((raw,)) = row else {
                return Err(StoreError::not_found("Product", &item.product_id));
            };

            let current = decimal_col("stock", &raw)?;
            let stock = clamped_stock(current, -item.quantity);

            sqlx::query("UPDATE products SET stock = ?2 WHERE id = ?1")
                .bind(&item.product_id)
                .bind(stock.to_string())
                .execute(&mut *tx)
                .await?;

            let reason = format!("Venta {}", id);
            let movement = insert_movement(
                &mut tx,
                NewMovement {
                    product_id: &item.product_id,
                    kind: MovementKind::Venta,
                    quantity: -item.quantity,
                    reason: Some(&reason),
                    at: now,
                },
            )
            .await?;

            stock_levels.push(StockLevel {
                product_id: item.product_id.clone(),
                stock,
            });
            movements.push(movement);
        }

        let charge = match &draft.client_id {
            Some(client_id) => {
                Some(charge_credit(&mut tx, client_id, draft.total, &draft.detail(), now).await?)
            }
            None => None,
        };

        tx.commit().await?;

        let sale = Sale {
            id,
            created_at: now,
            items: draft.items.clone(),
            total: draft.total,
            payment_method: draft.payment_method,
            client_id: draft.client_id.clone(),
        };

        Ok(SaleOutcome {
            sale,
            stock_levels,
            movements,
            charge,
        })
    }

    /// Lists all sales with their items, most recent first.
    pub async fn list(&self) -> StoreResult<Vec<Sale>> {
        let sale_rows: Vec<SaleRow> = sqlx::query_as(
            r#"
            SELECT id, created_at, total, payment_method, client_id
            FROM sales
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let item_rows: Vec<SaleItemRow> = sqlx::query_as(
            r#"
            SELECT sale_id, product_id, product_name, quantity, unit_price, subtotal
            FROM sale_items
            ORDER BY sale_id, position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut items: std::collections::HashMap<String, Vec<SaleItem>> =
            std::collections::HashMap::new();
        for row in item_rows {
            let (sale_id, item) = row.into_domain()?;
            items.entry(sale_id).or_default().push(item);
        }

        debug!(count = sale_rows.len(), "Loaded sales");

        sale_rows
            .into_iter()
            .map(|row| {
                let sale_items = items.remove(&row.id).unwrap_or_default();
                row.into_domain(sale_items)
            })
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{DataStore, DbConfig};
    use almacen_core::{Category, Money, Product, ProductDraft, Unit};

    fn draft(name: &str, sell: i64, stock: i64) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            category: Category::Bebidas,
            unit: Unit::Unidad,
            cost_price: Money::from_major(sell / 2),
            sell_price: Money::from_major(sell),
            stock: Decimal::from(stock),
            min_stock: Decimal::from(5),
        }
    }

    async fn seed(store: &DataStore, name: &str, sell: i64, stock: i64) -> Product {
        store.products().insert(&draft(name, sell, stock)).await.unwrap()
    }

    #[tokio::test]
    async fn test_record_sale_decrements_stock_and_appends_movements() {
        let store = DataStore::new(DbConfig::in_memory()).await.unwrap();
        let coca = seed(&store, "Coca-Cola 1.5L", 1800, 24).await;
        let fideos = seed(&store, "Fideos 500g", 950, 30).await;

        let sale_draft = SaleDraft::new(
            vec![
                SaleItem::snapshot(&coca, Decimal::from(2)),
                SaleItem::snapshot(&fideos, Decimal::from(1)),
            ],
            PaymentMethod::Efectivo,
            None,
        );

        let outcome = store.sales().record_sale(&sale_draft).await.unwrap();

        assert_eq!(outcome.sale.total, Money::from_major(4550));
        assert!(outcome.charge.is_none());

        assert_eq!(outcome.stock_levels[0].stock, Decimal::from(22));
        assert_eq!(outcome.stock_levels[1].stock, Decimal::from(29));

        assert_eq!(outcome.movements.len(), 2);
        assert_eq!(outcome.movements[0].kind, MovementKind::Venta);
        assert_eq!(outcome.movements[0].quantity, Decimal::from(-2));
        assert_eq!(outcome.movements[1].quantity, Decimal::from(-1));
        assert_eq!(
            outcome.movements[0].reason.as_deref(),
            Some(format!("Venta {}", outcome.sale.id).as_str())
        );

        let stored = store.products().get_by_id(&coca.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, Decimal::from(22));
    }

    #[tokio::test]
    async fn test_record_fiado_sale_charges_client() {
        let store = DataStore::new(DbConfig::in_memory()).await.unwrap();
        let alfajor = seed(&store, "Alfajor Havanna", 900, 3).await;
        let client = store.clients().insert("Carlos Ruiz", "").await.unwrap();

        let sale_draft = SaleDraft::new(
            vec![SaleItem::snapshot(&alfajor, Decimal::from(2))],
            PaymentMethod::Fiado,
            Some(client.id.clone()),
        );

        let outcome = store.sales().record_sale(&sale_draft).await.unwrap();

        let charge = outcome.charge.unwrap();
        assert_eq!(charge.debt, Money::from_major(1800));
        assert_eq!(charge.purchase.detail, "Alfajor Havanna");

        let stored = store.clients().get_by_id(&client.id).await.unwrap().unwrap();
        assert_eq!(stored.debt, Money::from_major(1800));
        assert_eq!(stored.purchases.len(), 1);
    }

    #[tokio::test]
    async fn test_record_sale_unknown_client_rolls_everything_back() {
        let store = DataStore::new(DbConfig::in_memory()).await.unwrap();
        let coca = seed(&store, "Coca-Cola 1.5L", 1800, 24).await;

        let sale_draft = SaleDraft::new(
            vec![SaleItem::snapshot(&coca, Decimal::from(2))],
            PaymentMethod::Fiado,
            Some("c99".to_string()),
        );

        let err = store.sales().record_sale(&sale_draft).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        // No header, no stock change, no ledger entry survived
        assert!(store.sales().list().await.unwrap().is_empty());
        assert!(store.movements().list().await.unwrap().is_empty());
        let stored = store.products().get_by_id(&coca.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, Decimal::from(24));
    }

    #[tokio::test]
    async fn test_list_returns_most_recent_first_with_items() {
        let store = DataStore::new(DbConfig::in_memory()).await.unwrap();
        let coca = seed(&store, "Coca-Cola 1.5L", 1800, 24).await;

        let first = store
            .sales()
            .record_sale(&SaleDraft::new(
                vec![SaleItem::snapshot(&coca, Decimal::from(1))],
                PaymentMethod::Efectivo,
                None,
            ))
            .await
            .unwrap();
        let second = store
            .sales()
            .record_sale(&SaleDraft::new(
                vec![SaleItem::snapshot(&coca, Decimal::from(2))],
                PaymentMethod::Tarjeta,
                None,
            ))
            .await
            .unwrap();

        let sales = store.sales().list().await.unwrap();
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[0].id, second.sale.id);
        assert_eq!(sales[1].id, first.sale.id);
        assert_eq!(sales[0].items.len(), 1);
        assert_eq!(sales[0].items[0].product_name, "Coca-Cola 1.5L");
    }
}
