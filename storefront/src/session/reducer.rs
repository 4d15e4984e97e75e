//! Session reducer
//!
//! # Flow
//!
//! 1. `Login` / `Register` mark the session as loading and call the server
//! 2. On success the effect persists `token` and `user`, then reports back
//! 3. The result action applies the matching success or failure transition
//!
//! `Logout` and `Expired` end the session immediately. Only `Logout` touches
//! storage; on expiry the API client has already wiped it.

use crate::environment::SessionEnvironment;
use crate::providers::AuthApi;
use crate::session::actions::SessionAction;
use crate::session::state::{SessionEvent, SessionState};
use std::sync::Arc;
use storefront_api::{AuthResponse, User};
use storefront_core::effect::Effect;
use storefront_core::environment::{CredentialStorage, TOKEN_KEY, USER_KEY};
use storefront_core::reducer::Reducer;
use storefront_core::{smallvec, SmallVec};

/// Shown when a failed login carries no server message
pub const LOGIN_FAILED: &str = "Login failed";

/// Shown when a failed registration carries no server message
pub const REGISTRATION_FAILED: &str = "Registration failed";

/// Session reducer
#[derive(Debug, Clone)]
pub struct SessionReducer<A> {
    _phantom: std::marker::PhantomData<A>,
}

impl<A> SessionReducer<A> {
    /// Create a new session reducer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<A> Default for SessionReducer<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Write the credentials of a fresh session to durable storage
fn persist(storage: &dyn CredentialStorage, response: &AuthResponse) {
    storage.set(TOKEN_KEY, &response.token);
    match serde_json::to_string(&response.user) {
        Ok(raw) => storage.set(USER_KEY, &raw),
        Err(error) => tracing::warn!(%error, "failed to serialize user record"),
    }
}

impl<A> Reducer for SessionReducer<A>
where
    A: AuthApi + Clone + 'static,
{
    type State = SessionState;
    type Action = SessionAction;
    type Environment = SessionEnvironment<A>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // Login
            // ═══════════════════════════════════════════════════════════════
            SessionAction::Login {
                correlation_id,
                credentials,
            } => {
                state.apply(SessionEvent::LoginStart);

                let auth = env.auth.clone();
                let storage = Arc::clone(&env.storage);
                smallvec![Effect::future(async move {
                    match auth.login(&credentials).await {
                        Ok(response) => {
                            persist(storage.as_ref(), &response);
                            Some(SessionAction::LoginSucceeded {
                                correlation_id,
                                user: response.user,
                                token: response.token,
                            })
                        },
                        Err(error) => Some(SessionAction::LoginFailed {
                            correlation_id,
                            message: error.message_or(LOGIN_FAILED),
                        }),
                    }
                })]
            },

            SessionAction::LoginSucceeded { user, token, .. } => {
                log_signed_in(&user);
                state.apply(SessionEvent::LoginSuccess { user, token });
                smallvec![Effect::None]
            },

            SessionAction::LoginFailed { message, .. } => {
                tracing::debug!(%message, "login failed");
                state.apply(SessionEvent::LoginFailure(message));
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Register
            // ═══════════════════════════════════════════════════════════════
            SessionAction::Register {
                correlation_id,
                account,
            } => {
                state.apply(SessionEvent::RegisterStart);

                let auth = env.auth.clone();
                let storage = Arc::clone(&env.storage);
                smallvec![Effect::future(async move {
                    match auth.register(&account).await {
                        Ok(response) => {
                            persist(storage.as_ref(), &response);
                            Some(SessionAction::RegisterSucceeded {
                                correlation_id,
                                user: response.user,
                                token: response.token,
                            })
                        },
                        Err(error) => Some(SessionAction::RegisterFailed {
                            correlation_id,
                            message: error.message_or(REGISTRATION_FAILED),
                        }),
                    }
                })]
            },

            SessionAction::RegisterSucceeded { user, token, .. } => {
                log_signed_in(&user);
                state.apply(SessionEvent::RegisterSuccess { user, token });
                smallvec![Effect::None]
            },

            SessionAction::RegisterFailed { message, .. } => {
                tracing::debug!(%message, "registration failed");
                state.apply(SessionEvent::RegisterFailure(message));
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Session end
            // ═══════════════════════════════════════════════════════════════
            SessionAction::Logout => {
                tracing::info!("signed out");
                state.apply(SessionEvent::Logout);

                let storage = Arc::clone(&env.storage);
                smallvec![Effect::future(async move {
                    storage.remove(TOKEN_KEY);
                    storage.remove(USER_KEY);
                    None
                })]
            },

            SessionAction::Expired => {
                if state.is_authenticated {
                    tracing::info!("session expired");
                }
                state.apply(SessionEvent::Logout);
                smallvec![Effect::None]
            },
        }
    }
}

fn log_signed_in(user: &User) {
    tracing::info!(user_id = user.id, "signed in");
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::mocks::MockAuthApi;
    use crate::session::state::SessionPhase;
    use storefront_api::{ApiError, Credentials, MemoryStorage, NewAccount};
    use storefront_testing::{assertions, ReducerTest};
    use uuid::Uuid;

    type TestReducer = SessionReducer<MockAuthApi>;

    fn environment(auth: MockAuthApi) -> (SessionEnvironment<MockAuthApi>, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (SessionEnvironment::new(auth, storage.clone()), storage)
    }

    /// Run the single effect a command produced and return its result action
    async fn run_effect(
        reducer: &TestReducer,
        state: &mut SessionState,
        action: SessionAction,
        env: &SessionEnvironment<MockAuthApi>,
    ) -> Option<SessionAction> {
        let mut effects = reducer.reduce(state, action, env);
        assert_eq!(effects.len(), 1);
        match effects.remove(0) {
            Effect::Future(fut) => fut.await,
            other => unreachable!("expected a future effect, got {other:?}"),
        }
    }

    #[test]
    fn test_login_starts_loading_and_calls_server() {
        let (env, _) = environment(MockAuthApi::new());

        ReducerTest::new(TestReducer::new())
            .with_env(env)
            .given_state(SessionState::default())
            .when_action(SessionAction::Login {
                correlation_id: Uuid::new_v4(),
                credentials: Credentials::new("a@b.com", "secret"),
            })
            .then_state(|state| {
                assert_eq!(state.phase(), SessionPhase::Authenticating);
                assert_eq!(state.error, None);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[tokio::test]
    async fn test_login_persists_credentials_before_reporting() {
        let auth = MockAuthApi::new().with_user("a@b.com", "secret", User::new(1, "A"), "t1");
        let (env, storage) = environment(auth);
        let reducer = TestReducer::new();
        let mut state = SessionState::default();
        let correlation_id = Uuid::new_v4();

        let result = run_effect(
            &reducer,
            &mut state,
            SessionAction::Login {
                correlation_id,
                credentials: Credentials::new("a@b.com", "secret"),
            },
            &env,
        )
        .await
        .unwrap();

        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("t1"));
        assert_eq!(storage.get(USER_KEY).as_deref(), Some(r#"{"id":1,"name":"A"}"#));
        assert!(result.is_result_for(correlation_id));

        reducer.reduce(&mut state, result, &env);
        assert!(state.is_authenticated);
        assert_eq!(state.user, Some(User::new(1, "A")));
        assert_eq!(state.token.as_deref(), Some("t1"));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_login_failure_uses_server_message() {
        let (env, storage) = environment(MockAuthApi::new());
        let reducer = TestReducer::new();
        let mut state = SessionState::default();

        let result = run_effect(
            &reducer,
            &mut state,
            SessionAction::Login {
                correlation_id: Uuid::new_v4(),
                credentials: Credentials::new("a@b.com", "wrong"),
            },
            &env,
        )
        .await
        .unwrap();
        reducer.reduce(&mut state, result, &env);

        assert_eq!(state.phase(), SessionPhase::AuthFailed);
        assert_eq!(state.error.as_deref(), Some("Invalid credentials"));
        assert_eq!(storage.get(TOKEN_KEY), None);
    }

    #[tokio::test]
    async fn test_register_failure_without_message_falls_back() {
        let auth = MockAuthApi::new().failing_with(ApiError::Network("refused".to_string()));
        let (env, _) = environment(auth);
        let reducer = TestReducer::new();
        let mut state = SessionState::default();

        let result = run_effect(
            &reducer,
            &mut state,
            SessionAction::Register {
                correlation_id: Uuid::new_v4(),
                account: NewAccount {
                    name: "A".to_string(),
                    email: "a@b.com".to_string(),
                    password: "secret".to_string(),
                },
            },
            &env,
        )
        .await
        .unwrap();
        reducer.reduce(&mut state, result, &env);

        assert_eq!(state.error.as_deref(), Some(REGISTRATION_FAILED));
        assert!(!state.is_authenticated);
    }

    #[tokio::test]
    async fn test_logout_clears_state_then_storage() {
        let (env, storage) = environment(MockAuthApi::new());
        storage.set(TOKEN_KEY, "t1");
        storage.set(USER_KEY, r#"{"id":1,"name":"A"}"#);
        let reducer = TestReducer::new();
        let mut state = SessionState::restore(storage.as_ref());
        assert!(state.is_authenticated);

        let result = run_effect(&reducer, &mut state, SessionAction::Logout, &env).await;

        assert_eq!(result, None);
        assert!(!state.is_authenticated);
        assert_eq!(storage.get(TOKEN_KEY), None);
        assert_eq!(storage.get(USER_KEY), None);
    }

    #[test]
    fn test_expired_ends_session_without_effects() {
        let (env, _) = environment(MockAuthApi::new());

        ReducerTest::new(TestReducer::new())
            .with_env(env)
            .given_state(SessionState::default())
            .when_action(SessionAction::LoginSucceeded {
                correlation_id: Uuid::new_v4(),
                user: User::new(1, "A"),
                token: "t1".to_string(),
            })
            .when_action(SessionAction::Expired)
            .then_state(|state| {
                assert!(!state.is_authenticated);
                assert_eq!(state.user, None);
                assert_eq!(state.token, None);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }
}
