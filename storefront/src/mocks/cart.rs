//! Mock cart provider for testing.

use super::lock;
use crate::providers::CartApi;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use storefront_api::{ApiError, CartLine, CartSnapshot, Money};

#[derive(Debug, Clone)]
struct Stock {
    name: String,
    price: Money,
    stock: u32,
}

#[derive(Debug, Default)]
struct Inner {
    products: HashMap<i64, Stock>,
    lines: Vec<(i64, i64, u32)>,
    next_cart_id: i64,
    fetch_failure: Option<ApiError>,
    mutation_failure: Option<ApiError>,
    calls: Vec<&'static str>,
}

impl Inner {
    fn snapshot(&self) -> CartSnapshot {
        let items: Vec<CartLine> = self
            .lines
            .iter()
            .filter_map(|&(cart_id, item_id, quantity)| {
                let product = self.products.get(&item_id)?;
                Some(CartLine {
                    cart_id,
                    item_id,
                    name: product.name.clone(),
                    price: product.price,
                    quantity,
                    stock: product.stock,
                    image_url: None,
                    total_price: Money::from_cents(product.price.cents() * i64::from(quantity)),
                })
            })
            .collect();

        CartSnapshot {
            total_amount: Money::from_cents(items.iter().map(|line| line.total_price.cents()).sum()),
            total_items: items.iter().map(|line| line.quantity).sum(),
            items,
        }
    }

    fn check_stock(&self, item_id: i64, quantity: u32) -> Result<(), ApiError> {
        match self.products.get(&item_id) {
            None => Err(rejected(404, "Item not found")),
            Some(product) if quantity > product.stock => Err(rejected(400, "Insufficient stock")),
            Some(_) => Ok(()),
        }
    }

    fn line_mut(&mut self, cart_id: i64) -> Result<&mut (i64, i64, u32), ApiError> {
        self.lines
            .iter_mut()
            .find(|(id, _, _)| *id == cart_id)
            .ok_or_else(|| rejected(404, "Cart item not found"))
    }
}

fn rejected(status: u16, message: &str) -> ApiError {
    ApiError::Remote {
        status,
        message: Some(message.to_string()),
    }
}

/// Mock cart provider
///
/// Plays the server: it owns the lines, checks stock, and computes line
/// and cart totals.
#[derive(Debug, Clone, Default)]
pub struct MockCartApi {
    inner: Arc<Mutex<Inner>>,
}

impl MockCartApi {
    /// Create an empty cart with no products
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a product available at `price_cents` per unit
    #[must_use]
    pub fn with_product(self, item_id: i64, name: &str, price_cents: i64, stock: u32) -> Self {
        lock(&self.inner).products.insert(
            item_id,
            Stock {
                name: name.to_string(),
                price: Money::from_cents(price_cents),
                stock,
            },
        );
        self
    }

    /// Put a line in the cart directly
    pub fn seed_line(&self, cart_id: i64, item_id: i64, quantity: u32) {
        let mut inner = lock(&self.inner);
        inner.next_cart_id = inner.next_cart_id.max(cart_id);
        inner.lines.push((cart_id, item_id, quantity));
    }

    /// Fail every `get_cart` with `error` (or stop failing with `None`)
    pub fn fail_fetches_with(&self, error: Option<ApiError>) {
        lock(&self.inner).fetch_failure = error;
    }

    /// Fail every mutation with `error` (or stop failing with `None`)
    pub fn fail_mutations_with(&self, error: Option<ApiError>) {
        lock(&self.inner).mutation_failure = error;
    }

    /// Provider methods called so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        lock(&self.inner).calls.clone()
    }

    /// What the server currently holds
    #[must_use]
    pub fn server_cart(&self) -> CartSnapshot {
        lock(&self.inner).snapshot()
    }

    fn mutate(
        &self,
        call: &'static str,
        apply: impl FnOnce(&mut Inner) -> Result<(), ApiError>,
    ) -> Result<(), ApiError> {
        let mut inner = lock(&self.inner);
        inner.calls.push(call);
        if let Some(error) = &inner.mutation_failure {
            return Err(error.clone());
        }
        apply(&mut inner)
    }
}

impl CartApi for MockCartApi {
    fn get_cart(&self) -> impl Future<Output = Result<CartSnapshot, ApiError>> + Send {
        let result = {
            let mut inner = lock(&self.inner);
            inner.calls.push("get_cart");
            match &inner.fetch_failure {
                Some(error) => Err(error.clone()),
                None => Ok(inner.snapshot()),
            }
        };
        async move { result }
    }

    fn add_to_cart(
        &self,
        item_id: i64,
        quantity: u32,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        let result = self.mutate("add_to_cart", |inner| {
            let existing = inner
                .lines
                .iter()
                .position(|&(_, line_item, _)| line_item == item_id);
            let current = existing.map_or(0, |index| inner.lines[index].2);
            inner.check_stock(item_id, current.saturating_add(quantity))?;
            match existing {
                Some(index) => inner.lines[index].2 = current.saturating_add(quantity),
                None => {
                    inner.next_cart_id += 1;
                    let cart_id = inner.next_cart_id;
                    inner.lines.push((cart_id, item_id, quantity));
                },
            }
            Ok(())
        });
        async move { result }
    }

    fn update_cart_line(
        &self,
        cart_id: i64,
        quantity: u32,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        let result = self.mutate("update_cart_line", |inner| {
            let item_id = inner.line_mut(cart_id)?.1;
            inner.check_stock(item_id, quantity)?;
            inner.line_mut(cart_id)?.2 = quantity;
            Ok(())
        });
        async move { result }
    }

    fn remove_cart_line(&self, cart_id: i64) -> impl Future<Output = Result<(), ApiError>> + Send {
        let result = self.mutate("remove_cart_line", |inner| {
            inner.line_mut(cart_id)?;
            inner.lines.retain(|(id, _, _)| *id != cart_id);
            Ok(())
        });
        async move { result }
    }

    fn clear_cart(&self) -> impl Future<Output = Result<(), ApiError>> + Send {
        let result = self.mutate("clear_cart", |inner| {
            inner.lines.clear();
            Ok(())
        });
        async move { result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_computes_totals() {
        let api = MockCartApi::new()
            .with_product(1, "Lamp", 1000, 5)
            .with_product(2, "Desk", 9950, 1);

        api.add_to_cart(1, 2).await.ok();
        api.add_to_cart(1, 1).await.ok();
        api.add_to_cart(2, 1).await.ok();

        let cart = api.get_cart().await.ok().unwrap_or_default();
        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.total_items, 4);
        assert_eq!(cart.total_amount, Money::from_cents(12950));
    }

    #[tokio::test]
    async fn test_stock_is_enforced() {
        let api = MockCartApi::new().with_product(1, "Lamp", 1000, 2);
        api.seed_line(7, 1, 2);

        assert_eq!(
            api.add_to_cart(1, 1).await,
            Err(rejected(400, "Insufficient stock"))
        );
        assert_eq!(
            api.update_cart_line(7, 3).await,
            Err(rejected(400, "Insufficient stock"))
        );
        assert_eq!(
            api.remove_cart_line(8).await,
            Err(rejected(404, "Cart item not found"))
        );
    }

    #[tokio::test]
    async fn test_huge_add_is_rejected_as_insufficient_stock() {
        let api = MockCartApi::new().with_product(1, "Lamp", 1000, 5);
        api.seed_line(7, 1, 2);

        assert_eq!(
            api.add_to_cart(1, u32::MAX).await,
            Err(rejected(400, "Insufficient stock"))
        );
        assert_eq!(api.server_cart().total_items, 2);
    }
}
