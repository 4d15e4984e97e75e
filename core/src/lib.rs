//! # Storefront Core
//!
//! Core traits and types for the storefront client.
//!
//! Every piece of client state (session, cart, catalog) is driven by the same
//! pattern: a reducer that turns actions into state changes plus effect
//! descriptions, and a runtime that executes those effects and feeds their
//! results back in as new actions.
//!
//! ## Core Concepts
//!
//! - **State**: Client-side view of one feature (session, cart, catalog)
//! - **Action**: All possible inputs to a reducer (commands and remote results)
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies (API, storage, navigation, clock)
//!
//! ## Example
//!
//! ```ignore
//! use storefront_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! impl Reducer for CartReducer {
//!     type State = CartState;
//!     type Action = CartAction;
//!     type Environment = CartEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CartState,
//!         action: CartAction,
//!         env: &CartEnvironment,
//!     ) -> SmallVec<[Effect<CartAction>; 4]> {
//!         smallvec![Effect::None]
//!     }
//! }
//! ```

pub use smallvec::{smallvec, SmallVec};

/// Reducer module - the single place where state transitions happen
pub mod reducer {
    use super::SmallVec;
    use super::effect::Effect;

    /// The Reducer trait - core abstraction for client-side state logic
    ///
    /// Reducers never perform I/O themselves. Anything that touches the
    /// network or durable storage is returned as an [`Effect`] and executed
    /// by the runtime, which feeds any resulting action back into `reduce`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for SessionReducer {
    ///     type State = SessionState;
    ///     type Action = SessionAction;
    ///     type Environment = SessionEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut SessionState,
    ///         action: SessionAction,
    ///         env: &SessionEnvironment,
    ///     ) -> SmallVec<[Effect<SessionAction>; 4]> {
    ///         match action {
    ///             SessionAction::Logout => {
    ///                 state.apply(SessionEvent::Logout);
    ///                 smallvec![Effect::None]
    ///             }
    ///             _ => smallvec![Effect::None],
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// Effect descriptions to be executed by the runtime
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - side effect descriptions
pub mod effect {
    use futures::future::BoxFuture;
    use std::future::Future;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what
    /// should happen, returned from reducers and executed by the `Store`.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects concurrently
        Parallel(Vec<Effect<Action>>),

        /// Run effects one after another, each to completion
        Sequential(Vec<Effect<Action>>),

        /// Dispatch an action after a delay (debounce, timeouts)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after the delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// If the future resolves to `Some(action)`, the action is fed back
        /// into the reducer.
        Future(BoxFuture<'static, Option<Action>>),
    }

    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Wrap an async computation as an effect
        #[must_use]
        pub fn future<F>(fut: F) -> Self
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Feed an action straight back into the store
        ///
        /// Unlike sending it from the caller, the action is broadcast to
        /// observers like any other effect output.
        #[must_use]
        pub fn send(action: Action) -> Self
        where
            Action: Send + 'static,
        {
            Effect::Future(Box::pin(async move { Some(action) }))
        }

        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// `true` for [`Effect::None`]
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Environment module - dependency injection traits
///
/// Everything a reducer's effects touch outside of memory is reached through
/// one of these traits, so tests can swap in fixed clocks, in-memory storage
/// and recording navigators.
pub mod environment {
    use chrono::{DateTime, Utc};
    use std::sync::Arc;

    /// Storage key holding the raw bearer token
    pub const TOKEN_KEY: &str = "token";

    /// Storage key holding the JSON-serialized user record
    pub const USER_KEY: &str = "user";

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    impl<T: Clock + ?Sized> Clock for Arc<T> {
        fn now(&self) -> DateTime<Utc> {
            (**self).now()
        }
    }

    /// Durable string key/value storage that survives a restart
    ///
    /// Writes are fire-and-forget: implementations log failures instead of
    /// returning them.
    pub trait CredentialStorage: Send + Sync {
        /// Read a value
        fn get(&self, key: &str) -> Option<String>;

        /// Write a value, replacing any previous one
        fn set(&self, key: &str, value: &str);

        /// Remove a value if present
        fn remove(&self, key: &str);
    }

    impl<T: CredentialStorage + ?Sized> CredentialStorage for Arc<T> {
        fn get(&self, key: &str) -> Option<String> {
            (**self).get(key)
        }

        fn set(&self, key: &str, value: &str) {
            (**self).set(key, value);
        }

        fn remove(&self, key: &str) {
            (**self).remove(key);
        }
    }

    /// Forces the client back to its login entry point
    pub trait Navigator: Send + Sync {
        /// Leave whatever the user was doing and show the login entry point
        fn redirect_to_login(&self);
    }

    impl<T: Navigator + ?Sized> Navigator for Arc<T> {
        fn redirect_to_login(&self) {
            (**self).redirect_to_login();
        }
    }
}
