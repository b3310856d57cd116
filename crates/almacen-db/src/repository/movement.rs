//! # Stock Movement Repository
//!
//! Database operations for the stock ledger.
//!
//! The ledger is append-only: rows are inserted by sale commits and stock
//! adjustments, and only ever read back. There is no update or delete.
//! Catalog stock is the source of truth; this ledger is its audit trail,
//! and the two agree by construction because every stock write inserts its
//! movement in the same transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::StoreResult;
use crate::repository::{decimal_col, new_id};
use almacen_core::{MovementKind, StockMovement};

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw `stock_movements` row. Mapped into [`StockMovement`] before leaving
/// this crate.
#[derive(Debug, sqlx::FromRow)]
struct MovementRow {
    id: String,
    product_id: String,
    created_at: DateTime<Utc>,
    kind: MovementKind,
    quantity: String,
    reason: Option<String>,
}

impl MovementRow {
    fn into_domain(self) -> StoreResult<StockMovement> {
        let quantity = decimal_col("quantity", &self.quantity)?;
        Ok(StockMovement {
            id: self.id,
            product_id: self.product_id,
            created_at: self.created_at,
            kind: self.kind,
            quantity,
            reason: self.reason,
        })
    }
}

// =============================================================================
// Writing (crate-internal)
// =============================================================================

/// A movement about to be appended.
pub(crate) struct NewMovement<'a> {
    pub product_id: &'a str,
    pub kind: MovementKind,
    /// Signed delta as requested by the caller, recorded verbatim.
    pub quantity: Decimal,
    pub reason: Option<&'a str>,
    pub at: DateTime<Utc>,
}

/// Appends a movement on an open connection.
///
/// Runs inside the caller's transaction so the ledger entry commits or
/// rolls back together with the stock write it records.
pub(crate) async fn insert_movement(
    conn: &mut SqliteConnection,
    movement: NewMovement<'_>,
) -> StoreResult<StockMovement> {
    let id = new_id();

    sqlx::query(
        r#"
        INSERT INTO stock_movements (id, product_id, created_at, kind, quantity, reason)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&id)
    .bind(movement.product_id)
    .bind(movement.at)
    .bind(movement.kind)
    .bind(movement.quantity.to_string())
    .bind(movement.reason)
    .execute(conn)
    .await?;

    Ok(StockMovement {
        id,
        product_id: movement.product_id.to_string(),
        created_at: movement.at,
        kind: movement.kind,
        quantity: movement.quantity,
        reason: movement.reason.map(str::to_string),
    })
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for stock ledger queries.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Lists all movements, ordered by occurrence time ascending.
    pub async fn list(&self) -> StoreResult<Vec<StockMovement>> {
        let rows: Vec<MovementRow> = sqlx::query_as(
            r#"
            SELECT id, product_id, created_at, kind, quantity, reason
            FROM stock_movements
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Loaded stock movements");
        rows.into_iter().map(MovementRow::into_domain).collect()
    }

    /// Lists the movements of one product, ordered by occurrence time
    /// ascending.
    pub async fn list_for_product(&self, product_id: &str) -> StoreResult<Vec<StockMovement>> {
        let rows: Vec<MovementRow> = sqlx::query_as(
            r#"
            SELECT id, product_id, created_at, kind, quantity, reason
            FROM stock_movements
            WHERE product_id = ?1
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MovementRow::into_domain).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
