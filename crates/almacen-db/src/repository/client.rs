//! # Client Repository
//!
//! Database operations for clients and their credit ledgers.
//!
//! A client row carries the running debt; the `client_purchases` and
//! `client_payments` tables are its append-only histories. Debt writes and
//! their history entries always share a transaction.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::repository::{money_col, new_id};
use almacen_core::{Client, ClientPayment, ClientPurchase, Money};

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw `clients` row, without histories.
#[derive(Debug, sqlx::FromRow)]
struct ClientRow {
    id: String,
    name: String,
    phone: String,
    debt: String,
}

impl ClientRow {
    fn into_domain(
        self,
        purchases: Vec<ClientPurchase>,
        payments: Vec<ClientPayment>,
    ) -> StoreResult<Client> {
        Ok(Client {
            debt: money_col("debt", &self.debt)?,
            id: self.id,
            name: self.name,
            phone: self.phone,
            purchases,
            payments,
        })
    }
}

/// Raw `client_purchases` row.
#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    client_id: String,
    date: DateTime<Utc>,
    amount: String,
    detail: String,
}

impl PurchaseRow {
    fn into_domain(self) -> StoreResult<(String, ClientPurchase)> {
        let amount = money_col("amount", &self.amount)?;
        Ok((
            self.client_id,
            ClientPurchase {
                date: self.date,
                amount,
                detail: self.detail,
            },
        ))
    }
}

/// Raw `client_payments` row.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    client_id: String,
    date: DateTime<Utc>,
    amount: String,
}

impl PaymentRow {
    fn into_domain(self) -> StoreResult<(String, ClientPayment)> {
        let amount = money_col("amount", &self.amount)?;
        Ok((
            self.client_id,
            ClientPayment {
                date: self.date,
                amount,
            },
        ))
    }
}

// =============================================================================
// Results
// =============================================================================

/// Result of charging a fiado sale to a client.
#[derive(Debug, Clone)]
pub struct ClientCharge {
    pub client_id: String,
    /// Debt after the charge.
    pub debt: Money,
    /// The purchase entry appended to the client's history.
    pub purchase: ClientPurchase,
}

/// Result of registering a payment.
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    pub client_id: String,
    /// Debt after the payment; clamped at zero.
    pub debt: Money,
    /// The payment entry appended to the client's history.
    pub payment: ClientPayment,
}

// =============================================================================
// Writing (crate-internal)
// =============================================================================

/// Adds a fiado sale to a client's debt on an open connection.
///
/// Runs inside the sale transaction: the debt increase and the purchase
/// entry commit or roll back with the sale itself.
pub(crate) async fn charge_credit(
    conn: &mut SqliteConnection,
    client_id: &str,
    amount: Money,
    detail: &str,
    at: DateTime<Utc>,
) -> StoreResult<ClientCharge> {
    let row: Option<(String,)> = sqlx::query_as("SELECT debt FROM clients WHERE id = ?1")
        .bind(client_id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some((raw,)) = row else {
        return Err(StoreError::not_found("Client", client_id));
    };

    let debt = money_col("debt", &raw)? + amount;

    sqlx::query("UPDATE clients SET debt = ?2 WHERE id = ?1")
        .bind(client_id)
        .bind(debt.amount().to_string())
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        "INSERT INTO client_purchases (client_id, date, amount, detail) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(client_id)
    .bind(at)
    .bind(amount.amount().to_string())
    .bind(detail)
    .execute(&mut *conn)
    .await?;

    Ok(ClientCharge {
        client_id: client_id.to_string(),
        debt,
        purchase: ClientPurchase {
            date: at,
            amount,
            detail: detail.to_string(),
        },
    })
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for client database operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Creates a new ClientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Lists all clients with their histories, sorted by name.
    pub async fn list(&self) -> StoreResult<Vec<Client>> {
        let rows: Vec<ClientRow> =
            sqlx::query_as("SELECT id, name, phone, debt FROM clients ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        let purchase_rows: Vec<PurchaseRow> = sqlx::query_as(
            "SELECT client_id, date, amount, detail FROM client_purchases ORDER BY date ASC, rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let payment_rows: Vec<PaymentRow> = sqlx::query_as(
            "SELECT client_id, date, amount FROM client_payments ORDER BY date ASC, rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut purchases: std::collections::HashMap<String, Vec<ClientPurchase>> =
            std::collections::HashMap::new();
        for row in purchase_rows {
            let (client_id, purchase) = row.into_domain()?;
            purchases.entry(client_id).or_default().push(purchase);
        }

        let mut payments: std::collections::HashMap<String, Vec<ClientPayment>> =
            std::collections::HashMap::new();
        for row in payment_rows {
            let (client_id, payment) = row.into_domain()?;
            payments.entry(client_id).or_default().push(payment);
        }

        debug!(count = rows.len(), "Loaded clients");

        rows.into_iter()
            .map(|row| {
                let p = purchases.remove(&row.id).unwrap_or_default();
                let pay = payments.remove(&row.id).unwrap_or_default();
                row.into_domain(p, pay)
            })
            .collect()
    }

    /// Gets a client by id, with histories.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Client>> {
        let row: Option<ClientRow> =
            sqlx::query_as("SELECT id, name, phone, debt FROM clients WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let purchase_rows: Vec<PurchaseRow> = sqlx::query_as(
            r#"
            SELECT client_id, date, amount, detail
            FROM client_purchases
            WHERE client_id = ?1
            ORDER BY date ASC, rowid ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let payment_rows: Vec<PaymentRow> = sqlx::query_as(
            r#"
            SELECT client_id, date, amount
            FROM client_payments
            WHERE client_id = ?1
            ORDER BY date ASC, rowid ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let purchases = purchase_rows
            .into_iter()
            .map(|r| r.into_domain().map(|(_, p)| p))
            .collect::<StoreResult<Vec<_>>>()?;
        let payments = payment_rows
            .into_iter()
            .map(|r| r.into_domain().map(|(_, p)| p))
            .collect::<StoreResult<Vec<_>>>()?;

        row.into_domain(purchases, payments).map(Some)
    }

    /// Inserts a new client with zero debt and empty histories, assigning
    /// its id.
    pub async fn insert(&self, name: &str, phone: &str) -> StoreResult<Client> {
        let id = new_id();
        debug!(id = %id, name = %name, "Inserting client");

        sqlx::query("INSERT INTO clients (id, name, phone, debt) VALUES (?1, ?2, ?3, ?4)")
            .bind(&id)
            .bind(name)
            .bind(phone)
            .bind(Money::zero().amount().to_string())
            .execute(&self.pool)
            .await?;

        Ok(Client {
            id,
            name: name.to_string(),
            phone: phone.to_string(),
            debt: Money::zero(),
            purchases: Vec::new(),
            payments: Vec::new(),
        })
    }

    /// Registers a payment towards a client's debt.
    ///
    /// The debt is clamped at zero: overpayment settles the debt, it never
    /// produces a credit balance. The payment entry records the amount as
    /// given. Debt write and history entry share a transaction.
    pub async fn register_payment(&self, id: &str, amount: Money) -> StoreResult<PaymentReceipt> {
        debug!(id = %id, amount = %amount, "Registering payment");

        let mut tx = self.pool.begin().await?;

        let row: Option<(String,)> = sqlx::query_as("SELECT debt FROM clients WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some((raw,)) = row else {
            return Err(StoreError::not_found("Client", id));
        };

        let debt = money_col("debt", &raw)?.saturating_sub(amount);
        let at = Utc::now();

        sqlx::query("UPDATE clients SET debt = ?2 WHERE id = ?1")
            .bind(id)
            .bind(debt.amount().to_string())
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO client_payments (client_id, date, amount) VALUES (?1, ?2, ?3)")
            .bind(id)
            .bind(at)
            .bind(amount.amount().to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(PaymentReceipt {
            client_id: id.to_string(),
            debt,
            payment: ClientPayment { date: at, amount },
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
