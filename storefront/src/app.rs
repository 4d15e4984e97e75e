//! Application context
//!
//! [`App`] wires the three stores to one [`ApiClient`] and keeps them
//! consistent with each other:
//!
//! - every change of the session's authentication status is forwarded to
//!   the cart, which refetches (signed in) or empties itself (signed out)
//! - every 401 seen by the API client ends the session
//!
//! Its methods are the operations a view layer calls. Each one returns once
//! the state reflects the result, with the single user-facing message as
//! the error.

use crate::cart::{CartAction, CartReducer, CartState, DEFAULT_QUANTITY};
use crate::catalog::{CatalogAction, CatalogReducer, CatalogState};
use crate::config::Config;
use crate::environment::{CartEnvironment, CatalogEnvironment, SessionEnvironment};
use crate::error::{Result, StorefrontError};
use crate::session::{Registration, SessionAction, SessionReducer, SessionState};
use std::sync::Arc;
use std::time::Duration;
use storefront_api::{ApiClient, Category, Credentials, Product, ProductFilter};
use storefront_core::environment::{CredentialStorage, Navigator, SystemClock};
use storefront_runtime::{Store, StoreError};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Shown when a single product fails to load
pub const PRODUCT_FAILED: &str = "Failed to load product";

/// Session store wired to the REST backend
pub type SessionStore = Store<
    SessionState,
    SessionAction,
    SessionEnvironment<ApiClient>,
    SessionReducer<ApiClient>,
>;

/// Cart store wired to the REST backend
pub type CartStore =
    Store<CartState, CartAction, CartEnvironment<ApiClient>, CartReducer<ApiClient>>;

/// Catalog store wired to the REST backend
pub type CatalogStore = Store<
    CatalogState,
    CatalogAction,
    CatalogEnvironment<ApiClient>,
    CatalogReducer<ApiClient>,
>;

/// The storefront client
///
/// Explicitly constructed and passed by reference; there is no global
/// instance.
pub struct App {
    config: Config,
    api: ApiClient,
    session: SessionStore,
    cart: CartStore,
    catalog: CatalogStore,
    tasks: Vec<JoinHandle<()>>,
}

impl App {
    /// Build the client and restore any stored session
    ///
    /// Must be called inside a tokio runtime. A restored session triggers a
    /// cart fetch in the background.
    #[must_use]
    pub fn new(
        config: Config,
        storage: Arc<dyn CredentialStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let api = ApiClient::new(config.api_url.clone(), Arc::clone(&storage), navigator);

        let restored = SessionState::restore(storage.as_ref());
        let authenticated = restored.is_authenticated;

        let session = Store::new(
            restored,
            SessionReducer::new(),
            SessionEnvironment::new(api.clone(), storage),
        );
        let cart = Store::new(
            CartState {
                authenticated,
                ..CartState::default()
            },
            CartReducer::new(),
            CartEnvironment::new(api.clone(), Arc::new(SystemClock)),
        );
        let catalog = Store::new(
            CatalogState::default(),
            CatalogReducer::new(),
            CatalogEnvironment::new(api.clone()).with_debounce(config.search_debounce),
        );

        let tasks = vec![
            forward_authentication(session.clone(), cart.clone(), authenticated),
            end_session_on_expiry(api.subscribe_expired(), session.clone()),
        ];

        tracing::debug!(api_url = %config.api_url, "storefront client ready");

        Self {
            config,
            api,
            session,
            cart,
            catalog,
            tasks,
        }
    }

    /// The configuration the client was built with
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    fn timeout(&self) -> Duration {
        self.config.operation_timeout
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Session
    // ═══════════════════════════════════════════════════════════════════════

    /// Current session
    pub async fn session(&self) -> SessionState {
        self.session.state(Clone::clone).await
    }

    /// Notified after every session transition
    #[must_use]
    pub fn session_changes(&self) -> watch::Receiver<u64> {
        self.session.subscribe_changes()
    }

    /// Sign in
    ///
    /// On success the credentials are persisted and the cart is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Operation`] with the server's message, or
    /// `"Login failed"`.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let correlation_id = Uuid::new_v4();
        let result = self
            .session
            .send_and_wait_for(
                SessionAction::Login {
                    correlation_id,
                    credentials: Credentials::new(email, password),
                },
                move |action| action.is_result_for(correlation_id),
                self.timeout(),
            )
            .await?;

        if let SessionAction::LoginFailed { message, .. } = result {
            return Err(StorefrontError::Operation(message));
        }
        self.sync_cart().await
    }

    /// Create an account and sign in as it
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Validation`] without contacting the server
    /// if the form is invalid, or [`StorefrontError::Operation`] with the
    /// server's message or `"Registration failed"`.
    pub async fn register(&self, registration: Registration) -> Result<()> {
        registration.validate()?;

        let correlation_id = Uuid::new_v4();
        let result = self
            .session
            .send_and_wait_for(
                SessionAction::Register {
                    correlation_id,
                    account: registration.into_account(),
                },
                move |action| action.is_result_for(correlation_id),
                self.timeout(),
            )
            .await?;

        if let SessionAction::RegisterFailed { message, .. } = result {
            return Err(StorefrontError::Operation(message));
        }
        self.sync_cart().await
    }

    /// Sign out, forget the stored credentials and empty the cart
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Store`] if the client is shutting down or
    /// storage cleanup does not finish in time.
    pub async fn logout(&self) -> Result<()> {
        let mut handle = self.session.send(SessionAction::Logout).await?;
        handle.wait_with_timeout(self.timeout()).await?;
        self.sync_cart().await
    }

    /// Tell the cart the current authentication status and wait until it
    /// has settled on it
    ///
    /// The background forwarder may have delivered the change already, so
    /// this waits on the cart's state rather than on its own send.
    async fn sync_cart(&self) -> Result<()> {
        let authenticated = self.session.state(|s| s.is_authenticated).await;
        let mut changes = self.cart.subscribe_changes();
        self.cart
            .send(CartAction::AuthenticationChanged { authenticated })
            .await?;

        tokio::time::timeout(self.timeout(), async {
            loop {
                let settled = self
                    .cart
                    .state(|s| s.authenticated == authenticated && !s.loading)
                    .await;
                if settled {
                    return Ok(());
                }
                if changes.changed().await.is_err() {
                    return Err(StoreError::ChannelClosed);
                }
            }
        })
        .await
        .map_err(|_| StoreError::Timeout)??;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Cart
    // ═══════════════════════════════════════════════════════════════════════

    /// Current cart
    pub async fn cart(&self) -> CartState {
        self.cart.state(Clone::clone).await
    }

    /// Notified after every cart transition
    #[must_use]
    pub fn cart_changes(&self) -> watch::Receiver<u64> {
        self.cart.subscribe_changes()
    }

    async fn run_cart(&self, action: CartAction, correlation_id: Uuid) -> Result<CartAction> {
        Ok(self
            .cart
            .send_and_wait_for(
                action,
                move |action| action.is_result_for(correlation_id),
                self.timeout(),
            )
            .await?)
    }

    /// Replace the cart with the server's
    ///
    /// Signed out, this empties the cart without contacting the server.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Operation`] with the server's message or
    /// `"Failed to fetch cart"`; the message is also kept in the cart state.
    pub async fn fetch_cart(&self) -> Result<()> {
        let correlation_id = Uuid::new_v4();
        match self
            .run_cart(CartAction::Fetch { correlation_id }, correlation_id)
            .await?
        {
            CartAction::Fetched {
                result: Err(message),
                ..
            } => Err(StorefrontError::Operation(message)),
            _ => Ok(()),
        }
    }

    /// Add `quantity` (default 1) units of product `item_id`, then refetch
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Operation`] with the server's message or
    /// `"Failed to add item to cart"`. A failed refetch is not an error.
    pub async fn add_item(&self, item_id: i64, quantity: Option<u32>) -> Result<()> {
        let correlation_id = Uuid::new_v4();
        let action = CartAction::AddItem {
            correlation_id,
            item_id,
            quantity: quantity.unwrap_or(DEFAULT_QUANTITY),
        };
        mutation_outcome(self.run_cart(action, correlation_id).await?)
    }

    /// Set the quantity of line `cart_id`, then refetch
    ///
    /// The quantity is forwarded as given; check it with
    /// [`storefront_api::CartLine::accepts_quantity`] first.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Operation`] with the server's message or
    /// `"Failed to update cart item"`. A failed refetch is not an error.
    pub async fn update_line(&self, cart_id: i64, quantity: u32) -> Result<()> {
        let correlation_id = Uuid::new_v4();
        let action = CartAction::UpdateLine {
            correlation_id,
            cart_id,
            quantity,
        };
        mutation_outcome(self.run_cart(action, correlation_id).await?)
    }

    /// Remove line `cart_id`, then refetch
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Operation`] with the server's message or
    /// `"Failed to remove item from cart"`. A failed refetch is not an error.
    pub async fn remove_line(&self, cart_id: i64) -> Result<()> {
        let correlation_id = Uuid::new_v4();
        let action = CartAction::RemoveLine {
            correlation_id,
            cart_id,
        };
        mutation_outcome(self.run_cart(action, correlation_id).await?)
    }

    /// Empty the cart on the server and locally
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Operation`] with the server's message or
    /// `"Failed to clear cart"`.
    pub async fn clear_cart(&self) -> Result<()> {
        let correlation_id = Uuid::new_v4();
        mutation_outcome(
            self.run_cart(CartAction::Clear { correlation_id }, correlation_id)
                .await?,
        )
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Catalog
    // ═══════════════════════════════════════════════════════════════════════

    /// Current catalog
    pub async fn catalog(&self) -> CatalogState {
        self.catalog.state(Clone::clone).await
    }

    /// Notified after every catalog transition
    #[must_use]
    pub fn catalog_changes(&self) -> watch::Receiver<u64> {
        self.catalog.subscribe_changes()
    }

    /// Change the filter; the listing reloads once input has settled
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Store`] if the client is shutting down.
    pub async fn set_filter(&self, filter: ProductFilter) -> Result<()> {
        self.catalog.send(CatalogAction::SetFilter { filter }).await?;
        Ok(())
    }

    /// Load the listing for `filter` now
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Operation`] with
    /// `"Failed to load products. Please try again."`.
    pub async fn products(&self, filter: ProductFilter) -> Result<Vec<Product>> {
        let correlation_id = Uuid::new_v4();
        let result = self
            .catalog
            .send_and_wait_for(
                CatalogAction::Refresh {
                    correlation_id,
                    filter: Some(filter),
                },
                move |action| action.is_result_for(correlation_id),
                self.timeout(),
            )
            .await?;

        match result {
            CatalogAction::Loaded { result, .. } => result.map_err(StorefrontError::Operation),
            _ => Ok(self.catalog.state(|s| s.products.clone()).await),
        }
    }

    /// Load the category list
    ///
    /// Failures are logged and leave the previous list in place.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Store`] if the client is shutting down or
    /// the load does not finish in time.
    pub async fn categories(&self) -> Result<Vec<Category>> {
        let mut handle = self.catalog.send(CatalogAction::LoadCategories).await?;
        handle.wait_with_timeout(self.timeout()).await?;
        Ok(self.catalog.state(|s| s.categories.clone()).await)
    }

    /// Fetch one product
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Operation`] with the server's message or
    /// `"Failed to load product"`.
    pub async fn product(&self, id: i64) -> Result<Product> {
        self.api
            .get_item(id)
            .await
            .map_err(|error| StorefrontError::Operation(error.message_or(PRODUCT_FAILED)))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Lifecycle
    // ═══════════════════════════════════════════════════════════════════════

    /// Stop background tasks and wait for in-flight effects
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Store`] if effects are still running after
    /// the operation timeout.
    pub async fn shutdown(mut self) -> Result<()> {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        let timeout = self.timeout();
        self.session.shutdown(timeout).await?;
        self.cart.shutdown(timeout).await?;
        self.catalog.shutdown(timeout).await?;
        tracing::debug!("storefront client shut down");
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

fn mutation_outcome(result: CartAction) -> Result<()> {
    match result {
        CartAction::MutationFailed { message, .. } => Err(StorefrontError::Operation(message)),
        _ => Ok(()),
    }
}

/// Forward every change of the session's authentication status to the cart
///
/// The cart starts out with `initial` already applied, so a restored
/// session only needs its first fetch.
fn forward_authentication(
    session: SessionStore,
    cart: CartStore,
    initial: bool,
) -> JoinHandle<()> {
    let mut changes = session.subscribe_changes();
    tokio::spawn(async move {
        if initial {
            let fetch = CartAction::Fetch {
                correlation_id: Uuid::new_v4(),
            };
            if let Err(error) = cart.send(fetch).await {
                tracing::debug!(%error, "cart no longer accepts actions");
                return;
            }
        }

        let mut last = initial;
        loop {
            let authenticated = session.state(|s| s.is_authenticated).await;
            if authenticated != last {
                last = authenticated;
                if let Err(error) = cart
                    .send(CartAction::AuthenticationChanged { authenticated })
                    .await
                {
                    tracing::debug!(%error, "cart no longer accepts actions");
                    return;
                }
            }
            if changes.changed().await.is_err() {
                return;
            }
        }
    })
}

/// End the session whenever the API client sees a 401
fn end_session_on_expiry(
    mut expired: broadcast::Receiver<()>,
    session: SessionStore,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match expired.recv().await {
                Ok(()) => {},
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "expiry notifications lagged");
                },
                Err(broadcast::error::RecvError::Closed) => return,
            }
            if let Err(error) = session.send(SessionAction::Expired).await {
                tracing::debug!(%error, "session no longer accepts actions");
                return;
            }
        }
    })
}
