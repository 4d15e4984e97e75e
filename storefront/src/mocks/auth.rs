//! Mock authentication provider for testing.

use super::lock;
use crate::providers::AuthApi;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use storefront_api::{ApiError, AuthResponse, Credentials, NewAccount, User};

#[derive(Debug, Clone)]
struct Account {
    password: String,
    user: User,
    token: String,
}

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    failure: Option<ApiError>,
    next_id: i64,
}

/// Mock authentication provider
///
/// Accounts live in memory. Unknown credentials are rejected with
/// `"Invalid credentials"`, duplicate registrations with
/// `"User already exists"`.
#[derive(Debug, Clone, Default)]
pub struct MockAuthApi {
    inner: Arc<Mutex<Inner>>,
    calls: Arc<AtomicUsize>,
}

impl MockAuthApi {
    /// Create a provider with no accounts
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account that logs in with `email` / `password`
    #[must_use]
    pub fn with_user(self, email: &str, password: &str, user: User, token: &str) -> Self {
        {
            let mut inner = lock(&self.inner);
            inner.next_id = inner.next_id.max(user.id);
            inner.accounts.insert(
                email.to_string(),
                Account {
                    password: password.to_string(),
                    user,
                    token: token.to_string(),
                },
            );
        }
        self
    }

    /// Fail every call with `error`
    #[must_use]
    pub fn failing_with(self, error: ApiError) -> Self {
        lock(&self.inner).failure = Some(error);
        self
    }

    /// Number of calls that reached the provider
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn rejected(message: &str) -> ApiError {
        ApiError::Remote {
            status: 400,
            message: Some(message.to_string()),
        }
    }
}

impl AuthApi for MockAuthApi {
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = {
            let inner = lock(&self.inner);
            match (&inner.failure, inner.accounts.get(&credentials.email)) {
                (Some(error), _) => Err(error.clone()),
                (None, Some(account)) if account.password == credentials.password => {
                    Ok(AuthResponse {
                        token: account.token.clone(),
                        user: account.user.clone(),
                    })
                },
                (None, _) => Err(Self::rejected("Invalid credentials")),
            }
        };
        async move { result }
    }

    fn register(
        &self,
        account: &NewAccount,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = {
            let mut inner = lock(&self.inner);
            if let Some(error) = &inner.failure {
                Err(error.clone())
            } else if inner.accounts.contains_key(&account.email) {
                Err(Self::rejected("User already exists"))
            } else {
                inner.next_id += 1;
                let user = User::new(inner.next_id, account.name.clone())
                    .with_email(account.email.clone());
                let token = format!("token-{}", inner.next_id);
                inner.accounts.insert(
                    account.email.clone(),
                    Account {
                        password: account.password.clone(),
                        user: user.clone(),
                        token: token.clone(),
                    },
                );
                Ok(AuthResponse { token, user })
            }
        };
        async move { result }
    }
}
