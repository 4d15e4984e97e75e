//! Error types for storefront operations

use storefront_runtime::StoreError;
use thiserror::Error;

/// Result type alias for storefront operations
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Failure of an [`App`](crate::app::App) operation
///
/// `Display` is the single human-readable message shown to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorefrontError {
    /// Input rejected before any network call
    #[error("{0}")]
    Validation(String),

    /// The remote call failed; the message is the server's or a per-operation
    /// fallback
    #[error("{0}")]
    Operation(String),

    /// The store could not run the operation (shutdown, timeout)
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl StorefrontError {
    /// The user-facing message
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable holds a value that does not parse
    #[error("Invalid value for {key}: {value:?}")]
    Invalid {
        /// Variable name
        key: String,
        /// Offending value
        value: String,
    },
}
