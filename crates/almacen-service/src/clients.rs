//! # Client Ledger Operations
//!
//! Client creation and debt payments. Debt only ever moves up through
//! fiado checkouts (see [`crate::checkout`]) and down through
//! `register_payment`; it is clamped at zero on payment.

use tracing::{debug, info};

use crate::error::{ServiceError, ServiceResult};
use crate::StoreService;
use almacen_core::validation::{validate_name, validate_payment_amount};
use almacen_core::{Client, CoreError, Money};

impl StoreService {
    /// Creates a client with zero debt and empty histories.
    pub async fn create_client(&self, name: &str, phone: Option<&str>) -> ServiceResult<Client> {
        debug!(name = %name, "create_client");
        validate_name("name", name)?;

        let client = self
            .store
            .clients()
            .insert(name.trim(), phone.unwrap_or_default())
            .await?;
        self.clients.with_mut(|c| c.push(client.clone()));

        info!(id = %client.id, name = %client.name, "Client created");
        Ok(client)
    }

    /// Registers a payment towards a client's debt.
    ///
    /// The debt is clamped at zero: paying more than is owed settles the
    /// debt, it never produces a credit balance. The payment history keeps
    /// the amount actually handed over.
    ///
    /// ## Returns
    /// * `Ok(Client)` - Updated client snapshot
    /// * `Err(ValidationError)` - Amount is not strictly positive
    /// * `Err(NotFound)` - Unknown client id; nothing written
    pub async fn register_payment(&self, client_id: &str, amount: Money) -> ServiceResult<Client> {
        debug!(client_id = %client_id, amount = %amount, "register_payment");
        validate_payment_amount(amount)?;

        if self.client(client_id).is_none() {
            return Err(CoreError::ClientNotFound(client_id.to_string()).into());
        }

        let receipt = self.store.clients().register_payment(client_id, amount).await?;

        self.clients.with_mut(|clients| {
            if let Some(c) = clients.iter_mut().find(|c| c.id == client_id) {
                c.debt = receipt.debt;
                c.payments.push(receipt.payment.clone());
            }
        });

        info!(
            client_id = %client_id,
            amount = %amount,
            debt = %receipt.debt,
            "Payment registered"
        );

        self.client(client_id)
            .ok_or_else(|| ServiceError::internal("Client vanished from mirror"))
    }
}
