//! Remote providers
//!
//! Traits for every remote dependency the reducers' effects call. The
//! production implementation of all three is [`ApiClient`]; tests use the
//! in-memory versions in [`crate::mocks`].

use std::future::Future;
use storefront_api::{
    ApiClient, ApiError, AuthResponse, CartSnapshot, Category, Credentials, NewAccount, Product,
    ProductFilter,
};

/// Account authentication
pub trait AuthApi: Send + Sync {
    /// Authenticate with email and password
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the server rejects the credentials or cannot
    /// be reached.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    /// Create an account and authenticate as it
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the server rejects the account or cannot be
    /// reached.
    fn register(
        &self,
        account: &NewAccount,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;
}

/// The authenticated user's server-side cart
pub trait CartApi: Send + Sync {
    /// Fetch the full cart
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any remote failure.
    fn get_cart(&self) -> impl Future<Output = Result<CartSnapshot, ApiError>> + Send;

    /// Add `quantity` units of product `item_id`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any remote failure.
    fn add_to_cart(
        &self,
        item_id: i64,
        quantity: u32,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Set the quantity of one line
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any remote failure.
    fn update_cart_line(
        &self,
        cart_id: i64,
        quantity: u32,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Remove one line
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any remote failure.
    fn remove_cart_line(&self, cart_id: i64) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Remove every line
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any remote failure.
    fn clear_cart(&self) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Read-only product catalog
pub trait CatalogApi: Send + Sync {
    /// List products matching `filter`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any remote failure.
    fn list_items(
        &self,
        filter: &ProductFilter,
    ) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    /// Fetch one product
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any remote failure.
    fn get_item(&self, id: i64) -> impl Future<Output = Result<Product, ApiError>> + Send;

    /// List categories
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any remote failure.
    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, ApiError>> + Send;
}

impl AuthApi for ApiClient {
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send {
        ApiClient::login(self, credentials)
    }

    fn register(
        &self,
        account: &NewAccount,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send {
        ApiClient::register(self, account)
    }
}

impl CartApi for ApiClient {
    fn get_cart(&self) -> impl Future<Output = Result<CartSnapshot, ApiError>> + Send {
        ApiClient::get_cart(self)
    }

    fn add_to_cart(
        &self,
        item_id: i64,
        quantity: u32,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        ApiClient::add_to_cart(self, item_id, quantity)
    }

    fn update_cart_line(
        &self,
        cart_id: i64,
        quantity: u32,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        ApiClient::update_cart_line(self, cart_id, quantity)
    }

    fn remove_cart_line(&self, cart_id: i64) -> impl Future<Output = Result<(), ApiError>> + Send {
        ApiClient::remove_cart_line(self, cart_id)
    }

    fn clear_cart(&self) -> impl Future<Output = Result<(), ApiError>> + Send {
        ApiClient::clear_cart(self)
    }
}

impl CatalogApi for ApiClient {
    fn list_items(
        &self,
        filter: &ProductFilter,
    ) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send {
        ApiClient::list_items(self, filter)
    }

    fn get_item(&self, id: i64) -> impl Future<Output = Result<Product, ApiError>> + Send {
        ApiClient::get_item(self, id)
    }

    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, ApiError>> + Send {
        ApiClient::list_categories(self)
    }
}
