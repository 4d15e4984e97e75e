//! Storefront REST client implementation

use crate::{
    error::ApiError,
    types::{
        AuthResponse, CartSnapshot, Category, Credentials, Envelope, NewAccount, Product,
        ProductFilter,
    },
};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use storefront_core::environment::{CredentialStorage, Navigator, TOKEN_KEY, USER_KEY};
use tokio::sync::broadcast;

/// Base URL used when none is configured
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Storefront REST client
///
/// Cheap to clone; clones share the HTTP connection pool, the credential
/// storage and the expiry channel.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    storage: Arc<dyn CredentialStorage>,
    navigator: Arc<dyn Navigator>,
    expired: broadcast::Sender<()>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// `{ "error": string }` body sent with non-2xx responses
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiClient {
    /// Create a client for `base_url`
    ///
    /// `storage` supplies the bearer token and is wiped on 401; `navigator`
    /// is sent to the login entry point on 401.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        storage: Arc<dyn CredentialStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (expired, _) = broadcast::channel(16);
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            storage,
            navigator,
            expired,
        }
    }

    /// The base URL every path is resolved against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Subscribe to authentication-expiry notifications
    ///
    /// One message is sent per 401 response, after storage has been wiped
    /// and the login redirect issued.
    #[must_use]
    pub fn subscribe_expired(&self) -> broadcast::Receiver<()> {
        self.expired.subscribe()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Auth
    // ═══════════════════════════════════════════════════════════════════

    /// Create an account
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for network failures, non-2xx responses, or
    /// unexpected bodies.
    pub async fn register(&self, account: &NewAccount) -> Result<AuthResponse, ApiError> {
        let response = self
            .send(self.request(Method::POST, "/auth/register").json(account))
            .await?;
        decode(response).await
    }

    /// Authenticate with email and password
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for network failures, non-2xx responses, or
    /// unexpected bodies.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        let response = self
            .send(self.request(Method::POST, "/auth/login").json(credentials))
            .await?;
        decode(response).await
    }

    // ═══════════════════════════════════════════════════════════════════
    // Catalog
    // ═══════════════════════════════════════════════════════════════════

    /// List catalog products matching `filter`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for network failures, non-2xx responses, or
    /// unexpected bodies.
    pub async fn list_items(&self, filter: &ProductFilter) -> Result<Vec<Product>, ApiError> {
        let response = self
            .send(self.request(Method::GET, "/items").query(&filter.query()))
            .await?;
        decode_data(response).await
    }

    /// Fetch one product
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for network failures, non-2xx responses, or
    /// unexpected bodies.
    pub async fn get_item(&self, id: i64) -> Result<Product, ApiError> {
        let response = self
            .send(self.request(Method::GET, &format!("/items/{id}")))
            .await?;
        decode_data(response).await
    }

    /// List catalog categories
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for network failures, non-2xx responses, or
    /// unexpected bodies.
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let response = self
            .send(self.request(Method::GET, "/items/categories"))
            .await?;
        decode_data(response).await
    }

    // ═══════════════════════════════════════════════════════════════════
    // Cart
    // ═══════════════════════════════════════════════════════════════════

    /// Fetch the full cart
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for network failures, non-2xx responses, or
    /// unexpected bodies.
    pub async fn get_cart(&self) -> Result<CartSnapshot, ApiError> {
        let response = self.send(self.request(Method::GET, "/cart")).await?;
        decode_data(response).await
    }

    /// Add `quantity` units of product `item_id`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for network failures or non-2xx responses.
    pub async fn add_to_cart(&self, item_id: i64, quantity: u32) -> Result<(), ApiError> {
        self.send(
            self.request(Method::POST, "/cart")
                .json(&json!({ "item_id": item_id, "quantity": quantity })),
        )
        .await
        .map(drop)
    }

    /// Set the quantity of cart line `cart_id`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for network failures or non-2xx responses.
    pub async fn update_cart_line(&self, cart_id: i64, quantity: u32) -> Result<(), ApiError> {
        self.send(
            self.request(Method::PUT, &format!("/cart/{cart_id}"))
                .json(&json!({ "quantity": quantity })),
        )
        .await
        .map(drop)
    }

    /// Remove cart line `cart_id`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for network failures or non-2xx responses.
    pub async fn remove_cart_line(&self, cart_id: i64) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, &format!("/cart/{cart_id}")))
            .await
            .map(drop)
    }

    /// Remove every cart line
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for network failures or non-2xx responses.
    pub async fn clear_cart(&self) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, "/cart"))
            .await
            .map(drop)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Plumbing
    // ═══════════════════════════════════════════════════════════════════

    /// Build a request with the stored bearer token attached
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.http.request(method, format!("{}{path}", self.base_url));
        match self.storage.get(TOKEN_KEY) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and map non-2xx statuses to [`ApiError`]
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .map(|body| body.error);

        if status == StatusCode::UNAUTHORIZED {
            self.expire_session();
            return Err(ApiError::AuthExpired { message });
        }

        tracing::debug!(status = status.as_u16(), ?message, "request failed");
        Err(ApiError::Remote {
            status: status.as_u16(),
            message,
        })
    }

    /// Drop stored credentials and send the user back to login
    fn expire_session(&self) {
        tracing::info!("authentication expired, clearing stored credentials");
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(USER_KEY);
        self.navigator.redirect_to_login();
        // No receivers is fine: the CLI may run without an App
        let _ = self.expired.send(());
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

async fn decode_data<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    decode::<Envelope<T>>(response).await.map(|envelope| envelope.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use storefront_testing::RecordingNavigator;

    fn client(base_url: &str) -> (ApiClient, Arc<MemoryStorage>, RecordingNavigator) {
        let storage = Arc::new(MemoryStorage::new());
        let navigator = RecordingNavigator::new();
        let client = ApiClient::new(base_url, storage.clone(), Arc::new(navigator.clone()));
        (client, storage, navigator)
    }

    #[test]
    fn test_client_creation_trims_trailing_slash() {
        let (client, _, _) = client("http://localhost:5000/api/");
        assert_eq!(client.base_url(), DEFAULT_API_URL);
    }

    #[test]
    fn test_expire_session_clears_storage_and_redirects_once() {
        let (client, storage, navigator) = client(DEFAULT_API_URL);
        storage.set(TOKEN_KEY, "t1");
        storage.set(USER_KEY, r#"{"id":1,"name":"A"}"#);
        let mut expired = client.subscribe_expired();

        client.expire_session();

        assert_eq!(storage.get(TOKEN_KEY), None);
        assert_eq!(storage.get(USER_KEY), None);
        assert_eq!(navigator.redirects(), 1);
        assert!(expired.try_recv().is_ok());
        assert!(expired.try_recv().is_err());
    }
}
