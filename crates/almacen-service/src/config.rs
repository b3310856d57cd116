//! # Service Configuration
//!
//! Identity and storage settings for one store.

use almacen_db::DbConfig;

/// Configuration for a [`crate::StoreService`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Display name of the store.
    pub store_name: String,

    /// Backing store configuration.
    pub db: DbConfig,
}

impl StoreConfig {
    /// Creates a configuration with the given database settings and the
    /// default store name.
    pub fn new(db: DbConfig) -> Self {
        StoreConfig {
            store_name: "Mi Almacén".to_string(),
            db,
        }
    }

    /// Sets the store name.
    pub fn store_name(mut self, name: impl Into<String>) -> Self {
        self.store_name = name.into();
        self
    }

    /// Creates an in-memory configuration (for testing).
    pub fn in_memory() -> Self {
        StoreConfig::new(DbConfig::in_memory())
    }
}
