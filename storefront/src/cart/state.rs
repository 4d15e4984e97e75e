//! Cart state and its transition function

use chrono::{DateTime, Utc};
use storefront_api::{CartLine, CartSnapshot, Money};

/// Local copy of the authenticated user's server-side cart
///
/// Replaced wholesale by every successful fetch and never patched; totals
/// are the server's. Stale while `loading` is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    /// Cart lines
    pub items: Vec<CartLine>,
    /// Server-computed sum of line totals
    pub total_amount: Money,
    /// Server-computed sum of quantities
    pub total_items: u32,
    /// A fetch is in flight
    pub loading: bool,
    /// Message from the last failed fetch
    pub error: Option<String>,
    /// When the last successful fetch landed
    pub synced_at: Option<DateTime<Utc>>,
    /// Last authentication status the cart was told about
    ///
    /// Fetches only reach the server while this is set.
    pub authenticated: bool,
}

/// Closed set of cart transitions
#[derive(Debug, Clone, PartialEq)]
pub enum CartEvent {
    /// Mark a fetch as started or finished
    SetLoading(bool),
    /// Replace the cart with a fresh server snapshot
    SetCart {
        /// The snapshot
        snapshot: CartSnapshot,
        /// When it was received
        synced_at: DateTime<Utc>,
    },
    /// Record a failed fetch, keeping the current lines
    SetError(String),
    /// Reset to the empty cart
    ClearCart,
}

impl CartState {
    /// Apply one transition
    ///
    /// `ClearCart` keeps `authenticated`: clearing the cart does not sign
    /// anybody out.
    pub fn apply(&mut self, event: CartEvent) {
        match event {
            CartEvent::SetLoading(loading) => {
                self.loading = loading;
            },
            CartEvent::SetCart {
                snapshot,
                synced_at,
            } => {
                self.items = snapshot.items;
                self.total_amount = snapshot.total_amount;
                self.total_items = snapshot.total_items;
                self.loading = false;
                self.error = None;
                self.synced_at = Some(synced_at);
            },
            CartEvent::SetError(message) => {
                self.loading = false;
                self.error = Some(message);
            },
            CartEvent::ClearCart => {
                *self = Self {
                    authenticated: self.authenticated,
                    ..Self::default()
                };
            },
        }
    }

    /// No lines in the cart
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The line with id `cart_id`
    #[must_use]
    pub fn line(&self, cart_id: i64) -> Option<&CartLine> {
        self.items.iter().find(|line| line.cart_id == cart_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_testing::test_clock;
    use storefront_core::environment::Clock;

    fn line(cart_id: i64, quantity: u32) -> CartLine {
        CartLine {
            cart_id,
            item_id: cart_id * 10,
            name: format!("Item {cart_id}"),
            price: Money::from_cents(1000),
            quantity,
            stock: 5,
            image_url: None,
            total_price: Money::from_cents(1000 * i64::from(quantity)),
        }
    }

    #[test]
    fn test_set_cart_replaces_wholesale() {
        let mut state = CartState {
            items: vec![line(1, 1), line(2, 1)],
            loading: true,
            error: Some("Failed to fetch cart".to_string()),
            authenticated: true,
            ..CartState::default()
        };

        state.apply(CartEvent::SetCart {
            snapshot: CartSnapshot {
                items: vec![line(7, 3)],
                total_amount: Money::from_cents(3000),
                total_items: 3,
            },
            synced_at: test_clock().now(),
        });

        assert_eq!(state.items, vec![line(7, 3)]);
        assert_eq!(state.total_amount, Money::from_cents(3000));
        assert_eq!(state.total_items, 3);
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(state.synced_at, Some(test_clock().now()));
        assert_eq!(state.line(7).map(|l| l.quantity), Some(3));
    }

    #[test]
    fn test_set_error_keeps_lines() {
        let mut state = CartState {
            items: vec![line(1, 2)],
            loading: true,
            ..CartState::default()
        };

        state.apply(CartEvent::SetError("Failed to fetch cart".to_string()));

        assert_eq!(state.items.len(), 1);
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("Failed to fetch cart"));
    }

    #[test]
    fn test_clear_cart_keeps_authentication() {
        let mut state = CartState {
            items: vec![line(1, 2)],
            total_items: 2,
            error: Some("x".to_string()),
            authenticated: true,
            ..CartState::default()
        };

        state.apply(CartEvent::ClearCart);

        assert!(state.is_empty());
        assert_eq!(state.total_items, 0);
        assert_eq!(state.error, None);
        assert!(state.authenticated);
    }
}
