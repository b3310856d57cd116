//! # almacen-db: Data Store Layer for Almacén
//!
//! This crate is the DataStore collaborator of the Almacén system. It owns
//! every database operation, using SQLite with sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Almacén Data Flow                                 │
//! │                                                                         │
//! │  Service operation (checkout, adjust_stock, register_payment)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    almacen-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   DataStore   │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ product, sale │    │  (embedded)  │  │   │
//! │  │   │               │    │ client, stock │    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   Typed row structs are mapped into domain entities HERE;      │   │
//! │  │   nothing above this crate sees a raw row.                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │                       SQLite Database (WAL)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and the [`DataStore`] handle
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Data store error types
//! - [`repository`] - Repository implementations (product, sale, client,
//!   stock movement)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use almacen_db::{DataStore, DbConfig};
//!
//! let store = DataStore::new(DbConfig::new("path/to/almacen.db")).await?;
//! let products = store.products().list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{DataStore, DbConfig};

// Repository re-exports for convenience
pub use repository::client::{ClientCharge, ClientRepository, PaymentReceipt};
pub use repository::movement::MovementRepository;
pub use repository::product::{ProductRepository, StockAdjustment};
pub use repository::sale::{SaleOutcome, SaleRepository, StockLevel};
