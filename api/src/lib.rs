//! # Storefront API Client
//!
//! Typed client for the storefront REST backend.
//!
//! The client is the single point of egress for remote calls and owns two
//! cross-cutting behaviors:
//!
//! - **Credential attachment**: when durable storage holds a `token`, every
//!   request carries `Authorization: Bearer <token>`.
//! - **Expiry interception**: every 401 response wipes the stored
//!   credentials, forces navigation to the login entry point and notifies
//!   expiry subscribers, before the error reaches the caller.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use storefront_api::{ApiClient, Credentials, MemoryStorage};
//! # use storefront_core::environment::Navigator;
//! # struct Noop;
//! # impl Navigator for Noop { fn redirect_to_login(&self) {} }
//!
//! # async fn example() -> Result<(), storefront_api::ApiError> {
//! let client = ApiClient::new(
//!     "http://localhost:5000/api",
//!     Arc::new(MemoryStorage::new()),
//!     Arc::new(Noop),
//! );
//!
//! let auth = client
//!     .login(&Credentials::new("a@b.com", "secret"))
//!     .await?;
//! println!("logged in as {}", auth.user.name);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod storage;
pub mod types;

pub use client::{ApiClient, DEFAULT_API_URL};
pub use error::ApiError;
pub use storage::{FileStorage, MemoryStorage};
pub use types::{
    AuthResponse, CartLine, CartSnapshot, Category, Credentials, Money, NewAccount,
    ParseMoneyError, Product, ProductFilter, User,
};
