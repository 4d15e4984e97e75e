//! Cart actions

use storefront_api::CartSnapshot;
use uuid::Uuid;

/// Quantity added when the caller does not give one
pub const DEFAULT_QUANTITY: u32 = 1;

/// Cart action
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    // ═══════════════════════════════════════════════════════════════════════
    // Commands
    // ═══════════════════════════════════════════════════════════════════════
    /// The session gained or lost its authenticated user
    ///
    /// A change triggers a fetch, which empties the cart when signed out.
    AuthenticationChanged {
        /// New status
        authenticated: bool,
    },

    /// Replace the cart with the server's
    Fetch {
        /// Correlation ID of the request
        correlation_id: Uuid,
    },

    /// Add units of a product
    AddItem {
        /// Correlation ID of the request
        correlation_id: Uuid,
        /// Product id
        item_id: i64,
        /// Units to add
        quantity: u32,
    },

    /// Set the quantity of a line
    ///
    /// Not bounds-checked; see [`storefront_api::CartLine::accepts_quantity`].
    UpdateLine {
        /// Correlation ID of the request
        correlation_id: Uuid,
        /// Line id
        cart_id: i64,
        /// New quantity
        quantity: u32,
    },

    /// Remove a line
    RemoveLine {
        /// Correlation ID of the request
        correlation_id: Uuid,
        /// Line id
        cart_id: i64,
    },

    /// Remove every line
    Clear {
        /// Correlation ID of the request
        correlation_id: Uuid,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Results
    // ═══════════════════════════════════════════════════════════════════════
    /// A fetch finished
    ///
    /// `correlation_id` is the request that asked for it; fetches started
    /// by an authentication change have none.
    Fetched {
        /// Correlation ID of the originating request
        correlation_id: Option<Uuid>,
        /// The snapshot, or the user-facing failure message
        result: Result<CartSnapshot, String>,
    },

    /// A mutation was accepted; a refetch follows
    MutationSucceeded {
        /// Correlation ID of the request
        correlation_id: Uuid,
    },

    /// A mutation was rejected; local state is untouched
    MutationFailed {
        /// Correlation ID of the request
        correlation_id: Uuid,
        /// User-facing message
        message: String,
    },

    /// The cart was emptied
    Cleared {
        /// Correlation ID of the originating request
        correlation_id: Option<Uuid>,
    },
}

impl CartAction {
    /// Whether this action ends the request `correlation_id`
    #[must_use]
    pub fn is_result_for(&self, correlation_id: Uuid) -> bool {
        match self {
            Self::Fetched {
                correlation_id: origin,
                ..
            }
            | Self::Cleared {
                correlation_id: origin,
            } => *origin == Some(correlation_id),
            Self::MutationFailed {
                correlation_id: origin,
                ..
            } => *origin == correlation_id,
            _ => false,
        }
    }
}
