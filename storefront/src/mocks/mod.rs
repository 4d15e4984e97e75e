//! Mock provider implementations for testing.
//!
//! In-memory, deterministic stand-ins for the storefront backend. Clones
//! share state, so a test can keep a handle for inspection after moving
//! one into an environment.

pub mod auth;
pub mod cart;
pub mod catalog;

pub use auth::MockAuthApi;
pub use cart::MockCartApi;
pub use catalog::MockCatalogApi;

use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
