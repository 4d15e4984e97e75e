//! Cart reducer
//!
//! Every mutation goes to the server first. On success the whole cart is
//! fetched again and replaces the local copy; on failure nothing local
//! changes and the request ends with the server's message or a fallback.
//!
//! Overlapping fetches are not serialized: whichever response is reduced
//! last wins.

use crate::cart::actions::CartAction;
use crate::cart::state::{CartEvent, CartState};
use crate::environment::CartEnvironment;
use crate::providers::CartApi;
use storefront_api::ApiError;
use storefront_core::effect::Effect;
use storefront_core::reducer::Reducer;
use storefront_core::{smallvec, SmallVec};
use uuid::Uuid;

/// Shown when a failed fetch carries no server message
pub const FETCH_FAILED: &str = "Failed to fetch cart";
/// Shown when a failed add carries no server message
pub const ADD_FAILED: &str = "Failed to add item to cart";
/// Shown when a failed quantity change carries no server message
pub const UPDATE_FAILED: &str = "Failed to update cart item";
/// Shown when a failed removal carries no server message
pub const REMOVE_FAILED: &str = "Failed to remove item from cart";
/// Shown when a failed clear carries no server message
pub const CLEAR_FAILED: &str = "Failed to clear cart";

/// Cart reducer
#[derive(Debug, Clone)]
pub struct CartReducer<C> {
    _phantom: std::marker::PhantomData<C>,
}

impl<C> CartReducer<C> {
    /// Create a new cart reducer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<C> Default for CartReducer<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> CartReducer<C>
where
    C: CartApi + Clone + 'static,
{
    /// Start a full fetch, or empty the cart if nobody is signed in
    fn fetch(
        state: &mut CartState,
        env: &CartEnvironment<C>,
        origin: Option<Uuid>,
    ) -> SmallVec<[Effect<CartAction>; 4]> {
        if !state.authenticated {
            state.apply(CartEvent::ClearCart);
            return match origin {
                Some(correlation_id) => smallvec![Effect::send(CartAction::Cleared {
                    correlation_id: Some(correlation_id),
                })],
                None => smallvec![Effect::None],
            };
        }

        state.apply(CartEvent::SetLoading(true));

        let cart = env.cart.clone();
        smallvec![Effect::future(async move {
            let result = cart
                .get_cart()
                .await
                .map_err(|error| error.message_or(FETCH_FAILED));
            Some(CartAction::Fetched {
                correlation_id: origin,
                result,
            })
        })]
    }

    /// Run a remote mutation and report whether it was accepted
    fn mutate<F>(
        correlation_id: Uuid,
        fallback: &'static str,
        call: F,
    ) -> SmallVec<[Effect<CartAction>; 4]>
    where
        F: std::future::Future<Output = Result<(), ApiError>> + Send + 'static,
    {
        smallvec![Effect::future(async move {
            Some(match call.await {
                Ok(()) => CartAction::MutationSucceeded { correlation_id },
                Err(error) => CartAction::MutationFailed {
                    correlation_id,
                    message: error.message_or(fallback),
                },
            })
        })]
    }
}

impl<C> Reducer for CartReducer<C>
where
    C: CartApi + Clone + 'static,
{
    type State = CartState;
    type Action = CartAction;
    type Environment = CartEnvironment<C>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CartAction::AuthenticationChanged { authenticated } => {
                if state.authenticated == authenticated {
                    return smallvec![Effect::None];
                }
                tracing::debug!(authenticated, "cart authentication changed");
                state.authenticated = authenticated;
                Self::fetch(state, env, None)
            },

            CartAction::Fetch { correlation_id } => Self::fetch(state, env, Some(correlation_id)),

            CartAction::Fetched { result, .. } => {
                if !state.authenticated {
                    tracing::debug!("dropping cart fetched after sign-out");
                    return smallvec![Effect::None];
                }
                match result {
                    Ok(snapshot) => state.apply(CartEvent::SetCart {
                        snapshot,
                        synced_at: env.clock.now(),
                    }),
                    Err(message) => {
                        tracing::warn!(%message, "cart fetch failed");
                        state.apply(CartEvent::SetError(message));
                    },
                }
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Mutations
            // ═══════════════════════════════════════════════════════════════
            CartAction::AddItem {
                correlation_id,
                item_id,
                quantity,
            } => {
                let cart = env.cart.clone();
                Self::mutate(correlation_id, ADD_FAILED, async move {
                    cart.add_to_cart(item_id, quantity).await
                })
            },

            CartAction::UpdateLine {
                correlation_id,
                cart_id,
                quantity,
            } => {
                let cart = env.cart.clone();
                Self::mutate(correlation_id, UPDATE_FAILED, async move {
                    cart.update_cart_line(cart_id, quantity).await
                })
            },

            CartAction::RemoveLine {
                correlation_id,
                cart_id,
            } => {
                let cart = env.cart.clone();
                Self::mutate(correlation_id, REMOVE_FAILED, async move {
                    cart.remove_cart_line(cart_id).await
                })
            },

            CartAction::Clear { correlation_id } => {
                let cart = env.cart.clone();
                smallvec![Effect::future(async move {
                    Some(match cart.clear_cart().await {
                        Ok(()) => CartAction::Cleared {
                            correlation_id: Some(correlation_id),
                        },
                        Err(error) => CartAction::MutationFailed {
                            correlation_id,
                            message: error.message_or(CLEAR_FAILED),
                        },
                    })
                })]
            },

            CartAction::MutationSucceeded { correlation_id } => {
                Self::fetch(state, env, Some(correlation_id))
            },

            CartAction::MutationFailed { message, .. } => {
                tracing::debug!(%message, "cart mutation rejected");
                smallvec![Effect::None]
            },

            CartAction::Cleared { .. } => {
                state.apply(CartEvent::ClearCart);
                smallvec![Effect::None]
            },
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::mocks::MockCartApi;
    use std::sync::Arc;
    use storefront_api::Money;
    use storefront_core::environment::Clock;
    use storefront_testing::{assertions, test_clock, ReducerTest};

    type TestReducer = CartReducer<MockCartApi>;

    fn environment(cart: MockCartApi) -> CartEnvironment<MockCartApi> {
        CartEnvironment::new(cart, Arc::new(test_clock()))
    }

    fn signed_in() -> CartState {
        CartState {
            authenticated: true,
            ..CartState::default()
        }
    }

    /// Reduce `action`, then keep running whatever single future effect
    /// comes back, until the chain settles
    async fn settle(
        reducer: &TestReducer,
        state: &mut CartState,
        action: CartAction,
        env: &CartEnvironment<MockCartApi>,
    ) -> Vec<CartAction> {
        let mut produced = Vec::new();
        let mut next = Some(action);
        while let Some(action) = next.take() {
            for effect in reducer.reduce(state, action, env) {
                if let Effect::Future(fut) = effect {
                    next = fut.await;
                }
            }
            if let Some(action) = &next {
                produced.push(action.clone());
            }
        }
        produced
    }

    #[test]
    fn test_fetch_while_signed_out_clears_without_network() {
        let cart = MockCartApi::new();

        ReducerTest::new(TestReducer::new())
            .with_env(environment(cart.clone()))
            .given_state(CartState {
                error: Some("old".to_string()),
                ..CartState::default()
            })
            .when_action(CartAction::AuthenticationChanged {
                authenticated: false,
            })
            .when_action(CartAction::Fetch {
                correlation_id: Uuid::new_v4(),
            })
            .then_state(|state| {
                assert_eq!(*state, CartState::default());
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();

        assert!(cart.calls().is_empty());
    }

    #[test]
    fn test_sign_in_starts_loading() {
        ReducerTest::new(TestReducer::new())
            .with_env(environment(MockCartApi::new()))
            .given_state(CartState::default())
            .when_action(CartAction::AuthenticationChanged {
                authenticated: true,
            })
            .then_state(|state| {
                assert!(state.authenticated);
                assert!(state.loading);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_repeated_authentication_status_is_ignored() {
        ReducerTest::new(TestReducer::new())
            .with_env(environment(MockCartApi::new()))
            .given_state(signed_in())
            .when_action(CartAction::AuthenticationChanged {
                authenticated: true,
            })
            .then_state(|state| assert!(!state.loading))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[tokio::test]
    async fn test_update_line_refetches_server_totals() {
        let cart = MockCartApi::new().with_product(3, "Lamp", 1000, 5);
        cart.seed_line(7, 3, 1);
        let env = environment(cart.clone());
        let reducer = TestReducer::new();
        let mut state = signed_in();
        let correlation_id = Uuid::new_v4();

        let produced = settle(
            &reducer,
            &mut state,
            CartAction::UpdateLine {
                correlation_id,
                cart_id: 7,
                quantity: 3,
            },
            &env,
        )
        .await;

        assert!(produced.last().unwrap().is_result_for(correlation_id));
        assert_eq!(cart.calls(), vec!["update_cart_line", "get_cart"]);

        let line = state.line(7).unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.price, Money::from_cents(1000));
        assert_eq!(line.total_price, Money::from_cents(3000));
        assert_eq!(state.total_items, 3);
        assert_eq!(state.total_amount, Money::from_cents(3000));
        assert_eq!(state.synced_at, Some(test_clock().now()));
    }

    #[tokio::test]
    async fn test_rejected_add_leaves_cart_untouched() {
        let cart = MockCartApi::new().with_product(3, "Lamp", 1000, 1);
        let env = environment(cart.clone());
        let reducer = TestReducer::new();
        let mut state = signed_in();
        let before = state.clone();
        let correlation_id = Uuid::new_v4();

        let produced = settle(
            &reducer,
            &mut state,
            CartAction::AddItem {
                correlation_id,
                item_id: 3,
                quantity: 2,
            },
            &env,
        )
        .await;

        assert_eq!(
            produced,
            vec![CartAction::MutationFailed {
                correlation_id,
                message: "Insufficient stock".to_string(),
            }]
        );
        assert_eq!(state, before);
        assert_eq!(cart.calls(), vec!["add_to_cart"]);
    }

    #[tokio::test]
    async fn test_mutation_succeeds_even_when_refetch_fails() {
        let cart = MockCartApi::new().with_product(3, "Lamp", 1000, 5);
        cart.fail_fetches_with(Some(ApiError::Remote {
            status: 500,
            message: None,
        }));
        let env = environment(cart.clone());
        let reducer = TestReducer::new();
        let mut state = signed_in();
        let correlation_id = Uuid::new_v4();

        let produced = settle(
            &reducer,
            &mut state,
            CartAction::AddItem {
                correlation_id,
                item_id: 3,
                quantity: 1,
            },
            &env,
        )
        .await;

        assert_eq!(
            produced,
            vec![
                CartAction::MutationSucceeded { correlation_id },
                CartAction::Fetched {
                    correlation_id: Some(correlation_id),
                    result: Err(FETCH_FAILED.to_string()),
                },
            ]
        );
        assert_eq!(state.error.as_deref(), Some(FETCH_FAILED));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_clear_empties_without_refetch() {
        let cart = MockCartApi::new().with_product(3, "Lamp", 1000, 5);
        cart.seed_line(7, 3, 2);
        let env = environment(cart.clone());
        let reducer = TestReducer::new();
        let mut state = signed_in();
        settle(
            &reducer,
            &mut state,
            CartAction::Fetch {
                correlation_id: Uuid::new_v4(),
            },
            &env,
        )
        .await;
        assert_eq!(state.total_items, 2);

        for _ in 0..2 {
            settle(
                &reducer,
                &mut state,
                CartAction::Clear {
                    correlation_id: Uuid::new_v4(),
                },
                &env,
            )
            .await;
        }

        assert_eq!(cart.calls(), vec!["get_cart", "clear_cart", "clear_cart"]);
        assert!(state.is_empty());
        assert_eq!(state.total_amount, Money::ZERO);
        assert!(state.authenticated);
    }

    #[tokio::test]
    async fn test_clear_failure_uses_fallback() {
        let cart = MockCartApi::new();
        cart.fail_mutations_with(Some(ApiError::Network("refused".to_string())));
        let env = environment(cart);
        let reducer = TestReducer::new();
        let mut state = signed_in();
        let correlation_id = Uuid::new_v4();

        let produced = settle(&reducer, &mut state, CartAction::Clear { correlation_id }, &env).await;

        assert_eq!(
            produced,
            vec![CartAction::MutationFailed {
                correlation_id,
                message: CLEAR_FAILED.to_string(),
            }]
        );
    }

    #[test]
    fn test_fetch_landing_after_sign_out_is_dropped() {
        let snapshot = storefront_api::CartSnapshot {
            total_items: 4,
            ..storefront_api::CartSnapshot::default()
        };

        ReducerTest::new(TestReducer::new())
            .with_env(environment(MockCartApi::new()))
            .given_state(CartState::default())
            .when_action(CartAction::Fetched {
                correlation_id: None,
                result: Ok(snapshot),
            })
            .then_state(|state| assert_eq!(*state, CartState::default()))
            .run();
    }

    /// Reduce a fetch and hand back its request without running it
    fn start_fetch(
        reducer: &TestReducer,
        state: &mut CartState,
        env: &CartEnvironment<MockCartApi>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Option<CartAction>> + Send>> {
        let action = CartAction::Fetch {
            correlation_id: Uuid::new_v4(),
        };
        reducer
            .reduce(state, action, env)
            .into_iter()
            .find_map(|effect| match effect {
                Effect::Future(fut) => Some(fut),
                _ => None,
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_overlapping_fetches_keep_the_response_reduced_last() {
        let cart = MockCartApi::new()
            .with_product(3, "Lamp", 1000, 5)
            .with_product(4, "Desk", 5000, 5);
        cart.seed_line(7, 3, 1);
        let env = environment(cart.clone());
        let reducer = TestReducer::new();
        let mut state = signed_in();

        // Second request answers first, then the server changes before the
        // first one is answered.
        let first = start_fetch(&reducer, &mut state, &env);
        let second = start_fetch(&reducer, &mut state, &env);
        let early = second.await.unwrap();
        reducer.reduce(&mut state, early, &env);
        assert_eq!(state.items.len(), 1);

        cart.seed_line(8, 4, 2);
        let late = first.await.unwrap();
        reducer.reduce(&mut state, late, &env);

        assert_eq!(state.items.len(), 2);
        assert_eq!(state.total_items, 3);
        assert_eq!(state.total_amount, Money::from_cents(11000));
        assert!(!state.loading);

        // An older snapshot reduced after a newer one replaces it.
        let older = start_fetch(&reducer, &mut state, &env).await.unwrap();
        cart.seed_line(9, 3, 1);
        let newer = start_fetch(&reducer, &mut state, &env).await.unwrap();
        reducer.reduce(&mut state, newer, &env);
        assert_eq!(state.items.len(), 3);
        reducer.reduce(&mut state, older, &env);

        assert_eq!(state.items.len(), 2);
        assert_eq!(state.total_items, 3);
        assert!(!state.loading);
    }
}
