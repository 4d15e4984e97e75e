//! Mock catalog provider for testing.

use super::lock;
use crate::providers::CatalogApi;
use std::future::Future;
use std::sync::{Arc, Mutex};
use storefront_api::{ApiError, Category, Product, ProductFilter};

#[derive(Debug, Default)]
struct Inner {
    products: Vec<Product>,
    categories: Vec<Category>,
    failure: Option<ApiError>,
    filters: Vec<ProductFilter>,
}

/// Mock catalog provider
///
/// Filters by case-insensitive name search and exact category name; price
/// bounds are recorded but not applied.
#[derive(Debug, Clone, Default)]
pub struct MockCatalogApi {
    inner: Arc<Mutex<Inner>>,
}

impl MockCatalogApi {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product
    #[must_use]
    pub fn with_product(self, product: Product) -> Self {
        lock(&self.inner).products.push(product);
        self
    }

    /// Add a category
    #[must_use]
    pub fn with_category(self, id: i64, name: &str) -> Self {
        lock(&self.inner).categories.push(Category {
            id,
            name: name.to_string(),
        });
        self
    }

    /// Fail every call with `error` (or stop failing with `None`)
    pub fn fail_with(&self, error: Option<ApiError>) {
        lock(&self.inner).failure = error;
    }

    /// Filters passed to `list_items`, in order
    #[must_use]
    pub fn listed_filters(&self) -> Vec<ProductFilter> {
        lock(&self.inner).filters.clone()
    }
}

fn accepts(product: &Product, filter: &ProductFilter) -> bool {
    let search = filter.search.trim().to_lowercase();
    let name_matches = search.is_empty() || product.name.to_lowercase().contains(&search);
    let category_matches = filter.category.is_empty()
        || product.category_name.as_deref() == Some(filter.category.as_str());
    name_matches && category_matches
}

impl CatalogApi for MockCatalogApi {
    fn list_items(
        &self,
        filter: &ProductFilter,
    ) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send {
        let result = {
            let mut inner = lock(&self.inner);
            inner.filters.push(filter.clone());
            match &inner.failure {
                Some(error) => Err(error.clone()),
                None => Ok(inner
                    .products
                    .iter()
                    .filter(|product| accepts(product, filter))
                    .cloned()
                    .collect()),
            }
        };
        async move { result }
    }

    fn get_item(&self, id: i64) -> impl Future<Output = Result<Product, ApiError>> + Send {
        let result = {
            let inner = lock(&self.inner);
            match &inner.failure {
                Some(error) => Err(error.clone()),
                None => inner
                    .products
                    .iter()
                    .find(|product| product.id == id)
                    .cloned()
                    .ok_or_else(|| ApiError::Remote {
                        status: 404,
                        message: Some("Item not found".to_string()),
                    }),
            }
        };
        async move { result }
    }

    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, ApiError>> + Send {
        let result = {
            let inner = lock(&self.inner);
            match &inner.failure {
                Some(error) => Err(error.clone()),
                None => Ok(inner.categories.clone()),
            }
        };
        async move { result }
    }
}
