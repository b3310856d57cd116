//! # Service State
//!
//! In-memory mirrors of the persisted collections, plus the session cart.
//!
//! ## Mirror Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Mirror Discipline                                  │
//! │                                                                         │
//! │  Reads  ──────► always served from the mirror                          │
//! │  Writes ──────► go to the data store first; the mirror is folded       │
//! │                 forward only after the store confirms                  │
//! │  Hydration ───► once, at session start (StoreService::connect)         │
//! │                                                                         │
//! │  Each mirror is mutated only by its owning component's operations.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! Mirrors and the cart are wrapped in `Arc<Mutex<T>>`: operations may be
//! issued from concurrent tasks, and each access holds the lock only for
//! the duration of one closure.

use std::sync::{Arc, Mutex};

use almacen_core::Cart;

/// A process-local mirror of one persisted collection.
#[derive(Debug)]
pub(crate) struct Mirror<T> {
    inner: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone> Mirror<T> {
    /// Creates a mirror seeded with the given items.
    pub(crate) fn new(items: Vec<T>) -> Self {
        Mirror {
            inner: Arc::new(Mutex::new(items)),
        }
    }

    /// Returns a cloned snapshot of the mirrored collection.
    pub(crate) fn snapshot(&self) -> Vec<T> {
        self.inner.lock().expect("mirror mutex poisoned").clone()
    }

    /// Executes a function with read access to the mirror.
    pub(crate) fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Vec<T>) -> R,
    {
        let guard = self.inner.lock().expect("mirror mutex poisoned");
        f(&guard)
    }

    /// Executes a function with write access to the mirror.
    pub(crate) fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Vec<T>) -> R,
    {
        let mut guard = self.inner.lock().expect("mirror mutex poisoned");
        f(&mut guard)
    }
}

/// The session cart behind a mutex.
#[derive(Debug, Default)]
pub(crate) struct SharedCart {
    cart: Arc<Mutex<Cart>>,
}

impl SharedCart {
    /// Creates a new empty cart state.
    pub(crate) fn new() -> Self {
        SharedCart {
            cart: Arc::new(Mutex::new(Cart::new())),
        }
    }

    /// Executes a function with read access to the cart.
    pub(crate) fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().expect("cart mutex poisoned");
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub(crate) fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().expect("cart mutex poisoned");
        f(&mut cart)
    }
}
