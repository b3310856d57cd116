//! # Checkout
//!
//! Turns the session cart plus a payment selection into a committed sale.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        checkout()                                       │
//! │                                                                         │
//! │  1. Snapshot cart lines          (empty cart → ValidationError)        │
//! │  2. Resolve fiado client         (existing id, or created on the spot) │
//! │  3. Freeze items                 (name + price snapshots, subtotals)   │
//! │  4. record_sale                  (ONE transaction: header, items,      │
//! │                                   stock clamps, ledger, debt)          │
//! │  5. Fold outcome into mirrors    (stocks, movements, client, sale)     │
//! │  6. Clear the cart                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Steps 1-3 fail before anything is persisted. Step 4 commits atomically:
//! a failure inside it rolls the whole sale back, and neither the mirrors
//! nor the cart are touched. Overselling is allowed by design - stock
//! clamps at zero instead of rejecting the sale.

use tracing::{debug, info};

use crate::error::ServiceResult;
use crate::StoreService;
use almacen_core::{CoreError, PaymentMethod, Sale, SaleDraft, SaleItem, ValidationError};

/// How the fiado client is designated at checkout.
#[derive(Debug, Clone)]
pub enum ClientRef {
    /// An existing client id.
    Existing(String),
    /// A client created on the spot; name required, phone optional.
    New { name: String, phone: Option<String> },
}

impl StoreService {
    /// Commits the current cart as a sale.
    ///
    /// `client` is consulted only for fiado; for any other payment method
    /// it is ignored and no client is ever touched.
    ///
    /// ## Returns
    /// * `Ok(Sale)` - The committed sale, already visible in the mirrors
    /// * `Err(ValidationError)` - Empty cart, or fiado without a client
    /// * `Err(NotFound)` - The fiado client id is unknown
    pub async fn checkout(
        &self,
        payment_method: PaymentMethod,
        client: Option<ClientRef>,
    ) -> ServiceResult<Sale> {
        debug!(?payment_method, "checkout");

        let lines = self.cart.with_cart(|c| c.lines().to_vec());
        if lines.is_empty() {
            return Err(ValidationError::EmptyCart.into());
        }

        let client_id = if payment_method.is_fiado() {
            Some(self.resolve_client(client).await?)
        } else {
            None
        };

        let items: Vec<SaleItem> = lines
            .iter()
            .map(|line| SaleItem::snapshot(&line.product, line.quantity))
            .collect();
        let draft = SaleDraft::new(items, payment_method, client_id);

        let outcome = self.store.sales().record_sale(&draft).await?;

        // The store confirmed; fold every effect into the mirrors.
        self.products.with_mut(|products| {
            for level in &outcome.stock_levels {
                if let Some(p) = products.iter_mut().find(|p| p.id == level.product_id) {
                    p.stock = level.stock;
                }
            }
        });
        self.movements
            .with_mut(|m| m.extend(outcome.movements.iter().cloned()));
        if let Some(charge) = &outcome.charge {
            self.clients.with_mut(|clients| {
                if let Some(c) = clients.iter_mut().find(|c| c.id == charge.client_id) {
                    c.debt = charge.debt;
                    c.purchases.push(charge.purchase.clone());
                }
            });
        }
        self.sales.with_mut(|s| s.insert(0, outcome.sale.clone()));
        self.cart.with_cart_mut(|c| c.clear());

        info!(
            sale_id = %outcome.sale.id,
            total = %outcome.sale.total,
            items = outcome.sale.items.len(),
            ?payment_method,
            "Sale committed"
        );
        Ok(outcome.sale)
    }

    /// Resolves the fiado client to an id, creating the client just in
    /// time when asked to.
    async fn resolve_client(&self, client: Option<ClientRef>) -> ServiceResult<String> {
        match client {
            None => Err(ValidationError::MissingClient.into()),
            Some(ClientRef::Existing(id)) => {
                if self.client(&id).is_none() {
                    return Err(CoreError::ClientNotFound(id).into());
                }
                Ok(id)
            }
            Some(ClientRef::New { name, phone }) => {
                let created = self.create_client(&name, phone.as_deref()).await?;
                Ok(created.id)
            }
        }
    }
}
