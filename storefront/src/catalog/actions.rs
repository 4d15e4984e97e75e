//! Catalog actions

use storefront_api::{Category, Product, ProductFilter};
use uuid::Uuid;

/// Catalog action
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogAction {
    /// Replace the filter; the listing reloads once input settles
    SetFilter {
        /// New filter
        filter: ProductFilter,
    },

    /// Reload the listing now, optionally replacing the filter first
    Refresh {
        /// Correlation ID of the request
        correlation_id: Uuid,
        /// New filter; `None` keeps the current one
        filter: Option<ProductFilter>,
    },

    /// Debounce elapsed for `generation`
    Load {
        /// Filter generation the load was scheduled for
        generation: u64,
    },

    /// A listing load finished
    Loaded {
        /// Filter generation the load was started for
        generation: u64,
        /// Request that asked for it, if any
        correlation_id: Option<Uuid>,
        /// Products, or the user-facing failure message
        result: Result<Vec<Product>, String>,
    },

    /// Load the category list
    LoadCategories,

    /// The category list arrived
    CategoriesLoaded {
        /// All categories
        categories: Vec<Category>,
    },
}

impl CatalogAction {
    /// Whether this action ends the request `correlation_id`
    #[must_use]
    pub fn is_result_for(&self, correlation_id: Uuid) -> bool {
        matches!(
            self,
            Self::Loaded { correlation_id: Some(origin), .. } if *origin == correlation_id
        )
    }
}
