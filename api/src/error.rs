//! Error types for the storefront API client

use thiserror::Error;

/// Errors that can occur when talking to the storefront backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No response was received (connection refused, DNS, TLS, timeout)
    #[error("Network failure: {0}")]
    Network(String),

    /// The server answered with a non-2xx status
    #[error("API error (status {status}): {}", .message.as_deref().unwrap_or("no message"))]
    Remote {
        /// HTTP status code
        status: u16,
        /// Message from an `{ "error": string }` body, if the server sent one
        message: Option<String>,
    },

    /// The server answered 2xx with a body of an unexpected shape
    #[error("Response parsing failed: {0}")]
    Decode(String),

    /// The server answered 401
    ///
    /// Stored credentials are already gone and the login redirect already
    /// happened by the time a caller sees this.
    #[error("Authentication expired")]
    AuthExpired {
        /// Message from an `{ "error": string }` body, if the server sent one
        message: Option<String>,
    },
}

impl ApiError {
    /// The server-supplied message, if any
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Remote { message, .. } | Self::AuthExpired { message } => message.as_deref(),
            _ => None,
        }
    }

    /// The server-supplied message, or `fallback` when there is none
    ///
    /// This is the single human-readable string surfaced to users.
    #[must_use]
    pub fn message_or(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}
