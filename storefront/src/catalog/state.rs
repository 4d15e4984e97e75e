//! Catalog state

use storefront_api::{Category, Product, ProductFilter};

/// Product listing, category list and the filter that produced them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    /// Current filter, as last entered
    pub filter: ProductFilter,
    /// Products matching the last loaded filter
    pub products: Vec<Product>,
    /// All categories
    pub categories: Vec<Category>,
    /// A product load is in flight
    pub loading: bool,
    /// Message from the last failed product load
    pub error: Option<String>,
    /// Bumped on every filter change; loads for older generations are stale
    pub generation: u64,
}

impl CatalogState {
    /// Whether a load started for `generation` is still wanted
    #[must_use]
    pub const fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }
}
