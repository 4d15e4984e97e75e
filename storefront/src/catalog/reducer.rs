//! Catalog reducer
//!
//! Filter changes are debounced: each `SetFilter` bumps the generation and
//! schedules a `Load` for it after the quiet period. Loads and results for
//! an older generation are dropped, so only the latest filter is shown.

use crate::catalog::actions::CatalogAction;
use crate::catalog::state::CatalogState;
use crate::environment::CatalogEnvironment;
use crate::providers::CatalogApi;
use storefront_core::effect::Effect;
use storefront_core::reducer::Reducer;
use storefront_core::{smallvec, SmallVec};
use uuid::Uuid;

/// Shown when the product listing fails to load
pub const LOAD_FAILED: &str = "Failed to load products. Please try again.";

/// Catalog reducer
#[derive(Debug, Clone)]
pub struct CatalogReducer<P> {
    _phantom: std::marker::PhantomData<P>,
}

impl<P> CatalogReducer<P> {
    /// Create a new catalog reducer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<P> Default for CatalogReducer<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> CatalogReducer<P>
where
    P: CatalogApi + Clone + 'static,
{
    fn load(
        state: &mut CatalogState,
        env: &CatalogEnvironment<P>,
        correlation_id: Option<Uuid>,
    ) -> SmallVec<[Effect<CatalogAction>; 4]> {
        state.loading = true;
        state.error = None;

        let catalog = env.catalog.clone();
        let filter = state.filter.clone();
        let generation = state.generation;
        smallvec![Effect::future(async move {
            let result = catalog.list_items(&filter).await.map_err(|error| {
                tracing::warn!(%error, "product listing failed");
                LOAD_FAILED.to_string()
            });
            Some(CatalogAction::Loaded {
                generation,
                correlation_id,
                result,
            })
        })]
    }
}

impl<P> Reducer for CatalogReducer<P>
where
    P: CatalogApi + Clone + 'static,
{
    type State = CatalogState;
    type Action = CatalogAction;
    type Environment = CatalogEnvironment<P>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CatalogAction::SetFilter { filter } => {
                state.filter = filter;
                state.generation += 1;
                smallvec![Effect::Delay {
                    duration: env.debounce,
                    action: Box::new(CatalogAction::Load {
                        generation: state.generation,
                    }),
                }]
            },

            CatalogAction::Refresh {
                correlation_id,
                filter,
            } => {
                if let Some(filter) = filter {
                    state.filter = filter;
                }
                state.generation += 1;
                Self::load(state, env, Some(correlation_id))
            },

            CatalogAction::Load { generation } => {
                if !state.is_current(generation) {
                    tracing::trace!(generation, "skipping superseded load");
                    return smallvec![Effect::None];
                }
                Self::load(state, env, None)
            },

            CatalogAction::Loaded {
                generation, result, ..
            } => {
                if !state.is_current(generation) {
                    tracing::trace!(generation, "dropping superseded listing");
                    return smallvec![Effect::None];
                }
                state.loading = false;
                match result {
                    Ok(products) => {
                        state.products = products;
                        state.error = None;
                    },
                    Err(message) => state.error = Some(message),
                }
                smallvec![Effect::None]
            },

            CatalogAction::LoadCategories => {
                let catalog = env.catalog.clone();
                smallvec![Effect::future(async move {
                    match catalog.list_categories().await {
                        Ok(categories) => Some(CatalogAction::CategoriesLoaded { categories }),
                        Err(error) => {
                            tracing::warn!(%error, "category listing failed");
                            None
                        },
                    }
                })]
            },

            CatalogAction::CategoriesLoaded { categories } => {
                state.categories = categories;
                smallvec![Effect::None]
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockCatalogApi;
    use std::time::Duration;
    use storefront_api::{ApiError, ProductFilter};
    use storefront_testing::{assertions, ReducerTest};

    type TestReducer = CatalogReducer<MockCatalogApi>;

    fn environment(catalog: MockCatalogApi) -> CatalogEnvironment<MockCatalogApi> {
        CatalogEnvironment::new(catalog).with_debounce(Duration::from_millis(300))
    }

    #[test]
    fn test_set_filter_debounces_load() {
        ReducerTest::new(TestReducer::new())
            .with_env(environment(MockCatalogApi::new()))
            .given_state(CatalogState::default())
            .when_action(CatalogAction::SetFilter {
                filter: ProductFilter::default().with_search("la"),
            })
            .when_action(CatalogAction::SetFilter {
                filter: ProductFilter::default().with_search("lamp"),
            })
            .then_state(|state| {
                assert_eq!(state.generation, 2);
                assert_eq!(state.filter.search, "lamp");
                assert!(!state.loading);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_delayed_action(effects, |action| {
                    *action == CatalogAction::Load { generation: 2 }
                });
            })
            .run();
    }

    #[test]
    fn test_refresh_supersedes_pending_debounce() {
        ReducerTest::new(TestReducer::new())
            .with_env(environment(MockCatalogApi::new()))
            .given_state(CatalogState::default())
            .when_action(CatalogAction::SetFilter {
                filter: ProductFilter::default().with_search("la"),
            })
            .when_action(CatalogAction::Refresh {
                correlation_id: Uuid::new_v4(),
                filter: Some(ProductFilter::default().with_category("Lighting")),
            })
            .when_action(CatalogAction::Load { generation: 1 })
            .then_state(|state| {
                assert_eq!(state.generation, 2);
                assert_eq!(state.filter.category, "Lighting");
                assert_eq!(state.filter.search, "");
                assert!(state.loading);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_superseded_load_is_skipped() {
        ReducerTest::new(TestReducer::new())
            .with_env(environment(MockCatalogApi::new()))
            .given_state(CatalogState {
                generation: 2,
                ..CatalogState::default()
            })
            .when_action(CatalogAction::Load { generation: 1 })
            .then_state(|state| assert!(!state.loading))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_superseded_result_is_dropped() {
        ReducerTest::new(TestReducer::new())
            .with_env(environment(MockCatalogApi::new()))
            .given_state(CatalogState {
                generation: 2,
                loading: true,
                ..CatalogState::default()
            })
            .when_action(CatalogAction::Loaded {
                generation: 1,
                correlation_id: None,
                result: Err(LOAD_FAILED.to_string()),
            })
            .then_state(|state| {
                assert!(state.loading);
                assert_eq!(state.error, None);
            })
            .run();
    }

    #[tokio::test]
    async fn test_load_failure_sets_generic_message() {
        let catalog = MockCatalogApi::new();
        catalog.fail_with(Some(ApiError::Remote {
            status: 500,
            message: Some("db down".to_string()),
        }));
        let env = environment(catalog);
        let reducer = TestReducer::new();
        let mut state = CatalogState::default();

        let mut effects = reducer.reduce(&mut state, CatalogAction::Load { generation: 0 }, &env);
        assert!(state.loading);
        let Effect::Future(fut) = effects.remove(0) else {
            unreachable!("load always calls the server");
        };
        let loaded = fut.await;
        assert!(loaded.is_some());
        if let Some(action) = loaded {
            reducer.reduce(&mut state, action, &env);
        }

        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some(LOAD_FAILED));
    }

    #[tokio::test]
    async fn test_category_failure_is_not_surfaced() {
        let catalog = MockCatalogApi::new();
        catalog.fail_with(Some(ApiError::Network("refused".to_string())));
        let env = environment(catalog);
        let reducer = TestReducer::new();
        let mut state = CatalogState::default();

        let mut effects = reducer.reduce(&mut state, CatalogAction::LoadCategories, &env);
        let Effect::Future(fut) = effects.remove(0) else {
            unreachable!("categories always come from the server");
        };

        assert_eq!(fut.await, None);
        assert_eq!(state.error, None);
    }
}
