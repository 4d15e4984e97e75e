//! Session state and its transition function

use storefront_api::User;
use storefront_core::environment::{CredentialStorage, TOKEN_KEY, USER_KEY};

/// The authenticated identity, if any
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Whether a user is signed in
    pub is_authenticated: bool,
    /// The signed-in user
    pub user: Option<User>,
    /// The bearer token of the signed-in user
    pub token: Option<String>,
    /// A login or registration is in flight
    pub loading: bool,
    /// Message from the last failed login or registration
    pub error: Option<String>,
}

/// Coarse session lifecycle, derived from [`SessionState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nobody is signed in
    Anonymous,
    /// A login or registration is in flight
    Authenticating,
    /// A user is signed in
    Authenticated,
    /// The last login or registration failed
    AuthFailed,
}

/// Closed set of session transitions
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A login request started
    LoginStart,
    /// Login succeeded
    LoginSuccess {
        /// The authenticated user
        user: User,
        /// Their bearer token
        token: String,
    },
    /// Login failed
    LoginFailure(String),
    /// The session ended
    Logout,
    /// A registration request started
    RegisterStart,
    /// Registration succeeded
    RegisterSuccess {
        /// The new user
        user: User,
        /// Their bearer token
        token: String,
    },
    /// Registration failed
    RegisterFailure(String),
}

impl SessionState {
    /// Seed a session from durable storage
    ///
    /// Authenticated only if both `token` and `user` are stored and the user
    /// record parses. The token is trusted as-is; an expired one surfaces on
    /// the first 401.
    #[must_use]
    pub fn restore(storage: &dyn CredentialStorage) -> Self {
        let (Some(token), Some(raw_user)) = (storage.get(TOKEN_KEY), storage.get(USER_KEY)) else {
            return Self::default();
        };

        match serde_json::from_str::<User>(&raw_user) {
            Ok(user) => {
                tracing::debug!(user_id = user.id, "restored session from storage");
                Self {
                    is_authenticated: true,
                    user: Some(user),
                    token: Some(token),
                    ..Self::default()
                }
            },
            Err(error) => {
                tracing::warn!(%error, "stored user record is unreadable, starting signed out");
                Self::default()
            },
        }
    }

    /// Apply one transition
    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::LoginStart | SessionEvent::RegisterStart => {
                self.loading = true;
                self.error = None;
            },
            SessionEvent::LoginSuccess { user, token }
            | SessionEvent::RegisterSuccess { user, token } => {
                self.is_authenticated = true;
                self.user = Some(user);
                self.token = Some(token);
                self.loading = false;
                self.error = None;
            },
            SessionEvent::LoginFailure(message) | SessionEvent::RegisterFailure(message) => {
                self.loading = false;
                self.error = Some(message);
            },
            SessionEvent::Logout => {
                self.is_authenticated = false;
                self.user = None;
                self.token = None;
            },
        }
    }

    /// Current lifecycle phase
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        if self.loading {
            SessionPhase::Authenticating
        } else if self.is_authenticated {
            SessionPhase::Authenticated
        } else if self.error.is_some() {
            SessionPhase::AuthFailed
        } else {
            SessionPhase::Anonymous
        }
    }
}
