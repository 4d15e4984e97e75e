//! # Storefront
//!
//! Client-side state for an e-commerce storefront backed by a REST API.
//!
//! Three reducer-driven stores hold everything a view needs:
//!
//! - [`session`]: who is signed in, mirrored to durable storage so a restart
//!   keeps the user signed in
//! - [`cart`]: the server's cart for that user, refetched after every
//!   mutation so the server stays the source of truth
//! - [`catalog`]: the product listing for the current filter, reloaded once
//!   filter input settles
//!
//! [`App`] owns the stores and the [`ApiClient`](storefront_api::ApiClient),
//! keeps the cart in step with the session, and ends the session on any 401.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use storefront::{App, Config};
//! use storefront_api::MemoryStorage;
//! # use storefront_core::environment::Navigator;
//! # struct Noop;
//! # impl Navigator for Noop { fn redirect_to_login(&self) {} }
//!
//! # async fn example() -> storefront::Result<()> {
//! let app = App::new(Config::default(), Arc::new(MemoryStorage::new()), Arc::new(Noop));
//!
//! app.login("a@b.com", "secret").await?;
//! app.add_item(42, None).await?;
//!
//! let cart = app.cart().await;
//! println!("{} items, {} total", cart.total_items, cart.total_amount);
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod environment;
pub mod error;
pub mod providers;
pub mod session;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use app::{App, CartStore, CatalogStore, SessionStore, PRODUCT_FAILED};
pub use config::Config;
pub use error::{ConfigError, Result, StorefrontError};
pub use providers::{AuthApi, CartApi, CatalogApi};
