//! Reducer environments
//!
//! Everything the session, cart and catalog effects reach outside of memory.

use crate::providers::{AuthApi, CartApi, CatalogApi};
use std::sync::Arc;
use std::time::Duration;
use storefront_core::environment::{Clock, CredentialStorage};

/// Default delay between the last filter change and the catalog reload
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Session environment
#[derive(Clone)]
pub struct SessionEnvironment<A>
where
    A: AuthApi + Clone,
{
    /// Remote authentication
    pub auth: A,

    /// Durable storage for the token and user record
    pub storage: Arc<dyn CredentialStorage>,
}

impl<A> SessionEnvironment<A>
where
    A: AuthApi + Clone,
{
    /// Create a new session environment
    #[must_use]
    pub fn new(auth: A, storage: Arc<dyn CredentialStorage>) -> Self {
        Self { auth, storage }
    }
}

/// Cart environment
#[derive(Clone)]
pub struct CartEnvironment<C>
where
    C: CartApi + Clone,
{
    /// Remote cart
    pub cart: C,

    /// Stamps successful syncs
    pub clock: Arc<dyn Clock>,
}

impl<C> CartEnvironment<C>
where
    C: CartApi + Clone,
{
    /// Create a new cart environment
    #[must_use]
    pub fn new(cart: C, clock: Arc<dyn Clock>) -> Self {
        Self { cart, clock }
    }
}

/// Catalog environment
#[derive(Clone)]
pub struct CatalogEnvironment<P>
where
    P: CatalogApi + Clone,
{
    /// Remote catalog
    pub catalog: P,

    /// Quiet period before a filter change triggers a reload
    pub debounce: Duration,
}

impl<P> CatalogEnvironment<P>
where
    P: CatalogApi + Clone,
{
    /// Create a new catalog environment with the default debounce
    #[must_use]
    pub const fn new(catalog: P) -> Self {
        Self {
            catalog,
            debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }

    /// Override the debounce
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}
