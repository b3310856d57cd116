//! # almacen-service: Orchestration Layer for Almacén
//!
//! One [`StoreService`] instance holds the four owning components of the
//! system - product catalog, stock ledger, client debt ledger and cart -
//! and is the only mutation surface a UI collaborator may call. There is
//! no ambient global state: callers construct the service explicitly and
//! pass it by reference.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        StoreService                                     │
//! │                                                                         │
//! │   Mirrors (reads)                 Operations (writes)                  │
//! │   ───────────────                 ───────────────────                  │
//! │   products()                      create_product / update_product     │
//! │   clients()                       adjust_stock                        │
//! │   sales()                         checkout                            │
//! │   stock_movements()               create_client / register_payment    │
//! │   cart()                          add_to_cart / set_cart_quantity …   │
//! │                                                                         │
//! │   Every write goes to the SQLite store first; the mirrors are          │
//! │   folded forward only after the store confirms.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering
//! There is a single logical writer: each operation issues its store
//! writes sequentially and a sale commits atomically. Overlapping user
//! actions are not serialized against each other, though - nothing stops
//! a second operation from starting while an earlier one's write is still
//! in flight. The service therefore guarantees at-most loose ordering
//! between concurrent operations, not serializability.

// =============================================================================
// Module Declarations
// =============================================================================

mod cart;
mod catalog;
mod checkout;
mod clients;
mod config;
mod error;
mod reports;
mod state;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::ClientRef;
pub use config::StoreConfig;
pub use error::{ErrorCode, ServiceError, ServiceResult};
pub use reports::DailySummary;

use tracing::info;

use crate::state::{Mirror, SharedCart};
use almacen_core::{CartLine, Client, Money, Product, Sale, StockMovement};
use almacen_db::DataStore;

// =============================================================================
// Store Service
// =============================================================================

/// The running store: data store handle, entity mirrors and the session
/// cart.
#[derive(Debug)]
pub struct StoreService {
    config: StoreConfig,
    store: DataStore,
    products: Mirror<Product>,
    clients: Mirror<Client>,
    /// Most recent first.
    sales: Mirror<Sale>,
    /// Occurrence order, oldest first.
    movements: Mirror<StockMovement>,
    cart: SharedCart,
}

impl StoreService {
    /// Opens the data store and hydrates every mirror.
    ///
    /// This is the only moment reads touch the backing store; afterwards
    /// all reads are served from the mirrors.
    pub async fn connect(config: StoreConfig) -> ServiceResult<Self> {
        let store = DataStore::new(config.db.clone()).await?;

        let products = Mirror::new(store.products().list().await?);
        let clients = Mirror::new(store.clients().list().await?);
        let sales = Mirror::new(store.sales().list().await?);
        let movements = Mirror::new(store.movements().list().await?);

        info!(store = %config.store_name, "Store service ready");

        Ok(StoreService {
            config,
            store,
            products,
            clients,
            sales,
            movements,
            cart: SharedCart::new(),
        })
    }

    /// Display name of the store.
    pub fn store_name(&self) -> &str {
        &self.config.store_name
    }

    /// Data store handle, for maintenance tasks outside the service
    /// surface.
    pub fn store(&self) -> &DataStore {
        &self.store
    }

    // =========================================================================
    // Read-only mirrors
    // =========================================================================

    /// Snapshot of the product catalog, sorted by name at hydration.
    pub fn products(&self) -> Vec<Product> {
        self.products.snapshot()
    }

    /// Looks up one product in the mirror.
    pub fn product(&self, id: &str) -> Option<Product> {
        self.products.with(|p| p.iter().find(|x| x.id == id).cloned())
    }

    /// Snapshot of all clients with their histories.
    pub fn clients(&self) -> Vec<Client> {
        self.clients.snapshot()
    }

    /// Looks up one client in the mirror.
    pub fn client(&self, id: &str) -> Option<Client> {
        self.clients.with(|c| c.iter().find(|x| x.id == id).cloned())
    }

    /// Snapshot of all sales, most recent first.
    pub fn sales(&self) -> Vec<Sale> {
        self.sales.snapshot()
    }

    /// Snapshot of the stock ledger, oldest first.
    pub fn stock_movements(&self) -> Vec<StockMovement> {
        self.movements.snapshot()
    }

    /// The stock ledger of one product, oldest first.
    pub fn stock_movements_for(&self, product_id: &str) -> Vec<StockMovement> {
        self.movements.with(|m| {
            m.iter()
                .filter(|x| x.product_id == product_id)
                .cloned()
                .collect()
        })
    }

    /// Snapshot of the session cart lines.
    pub fn cart(&self) -> Vec<CartLine> {
        self.cart.with_cart(|c| c.lines().to_vec())
    }

    /// Derived cart total.
    pub fn cart_total(&self) -> Money {
        self.cart.with_cart(|c| c.total())
    }
}
