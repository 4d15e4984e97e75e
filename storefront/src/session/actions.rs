//! Session actions
//!
//! Commands carry a `correlation_id` so a caller can wait for the result of
//! its own request among concurrent ones.

use crate::error::StorefrontError;
use storefront_api::{Credentials, NewAccount, User};
use uuid::Uuid;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Session action
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    // ═══════════════════════════════════════════════════════════════════════
    // Commands
    // ═══════════════════════════════════════════════════════════════════════
    /// Authenticate with email and password
    Login {
        /// Correlation ID of the request
        correlation_id: Uuid,
        /// Email and password
        credentials: Credentials,
    },

    /// Create an account and sign in as it
    Register {
        /// Correlation ID of the request
        correlation_id: Uuid,
        /// Account details
        account: NewAccount,
    },

    /// Sign out and forget the stored credentials
    Logout,

    /// The server rejected the stored credentials
    ///
    /// Storage has already been wiped by the API client.
    Expired,

    // ═══════════════════════════════════════════════════════════════════════
    // Results
    // ═══════════════════════════════════════════════════════════════════════
    /// Login succeeded and the credentials are persisted
    LoginSucceeded {
        /// Correlation ID of the request
        correlation_id: Uuid,
        /// The authenticated user
        user: User,
        /// Their bearer token
        token: String,
    },

    /// Login failed
    LoginFailed {
        /// Correlation ID of the request
        correlation_id: Uuid,
        /// User-facing message
        message: String,
    },

    /// Registration succeeded and the credentials are persisted
    RegisterSucceeded {
        /// Correlation ID of the request
        correlation_id: Uuid,
        /// The new user
        user: User,
        /// Their bearer token
        token: String,
    },

    /// Registration failed
    RegisterFailed {
        /// Correlation ID of the request
        correlation_id: Uuid,
        /// User-facing message
        message: String,
    },
}

impl SessionAction {
    /// Correlation ID of a command or result, if it has one
    #[must_use]
    pub const fn correlation_id(&self) -> Option<Uuid> {
        match self {
            Self::Login { correlation_id, .. }
            | Self::Register { correlation_id, .. }
            | Self::LoginSucceeded { correlation_id, .. }
            | Self::LoginFailed { correlation_id, .. }
            | Self::RegisterSucceeded { correlation_id, .. }
            | Self::RegisterFailed { correlation_id, .. } => Some(*correlation_id),
            Self::Logout | Self::Expired => None,
        }
    }

    /// Whether this action ends the request `correlation_id`
    #[must_use]
    pub fn is_result_for(&self, correlation_id: Uuid) -> bool {
        matches!(
            self,
            Self::LoginSucceeded { .. }
                | Self::LoginFailed { .. }
                | Self::RegisterSucceeded { .. }
                | Self::RegisterFailed { .. }
        ) && self.correlation_id() == Some(correlation_id)
    }
}

/// Registration form as entered by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
    /// Password, typed again
    pub confirm_password: String,
}

impl Registration {
    /// Check the form before anything is sent
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Validation`] if the passwords differ or the
    /// password is shorter than [`MIN_PASSWORD_LEN`] characters.
    pub fn validate(&self) -> Result<(), StorefrontError> {
        if self.password != self.confirm_password {
            return Err(StorefrontError::Validation(
                "Passwords do not match".to_string(),
            ));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(StorefrontError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }
        Ok(())
    }

    /// The request body, without the confirmation
    #[must_use]
    pub fn into_account(self) -> NewAccount {
        NewAccount {
            name: self.name,
            email: self.email,
            password: self.password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(password: &str, confirm: &str) -> Registration {
        Registration {
            name: "A".to_string(),
            email: "a@b.com".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn test_validate_rejects_mismatch_first() {
        assert_eq!(
            form("abc", "abd").validate(),
            Err(StorefrontError::Validation("Passwords do not match".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_short_password() {
        assert_eq!(
            form("12345", "12345").validate().map_err(|e| e.to_string()),
            Err("Password must be at least 6 characters long".to_string())
        );
        assert!(form("123456", "123456").validate().is_ok());
    }

    #[test]
    fn test_result_matching_uses_correlation_id() {
        let id = Uuid::new_v4();
        let failed = SessionAction::LoginFailed {
            correlation_id: id,
            message: "Login failed".to_string(),
        };

        assert!(failed.is_result_for(id));
        assert!(!failed.is_result_for(Uuid::new_v4()));
        assert!(!SessionAction::Logout.is_result_for(id));
    }
}
