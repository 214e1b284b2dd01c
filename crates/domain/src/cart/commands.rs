//! Cart commands.

use common::{AggregateId, CatalogItemId};

use crate::command::Command;

use super::Cart;

/// Command to open the cart of a new storefront session.
#[derive(Debug, Clone)]
pub struct OpenCart {
    pub cart_id: AggregateId,
}

impl OpenCart {
    pub fn new(cart_id: AggregateId) -> Self {
        Self { cart_id }
    }

    /// Opens a cart under a freshly generated id.
    pub fn generate() -> Self {
        Self {
            cart_id: AggregateId::new(),
        }
    }
}

impl Command for OpenCart {
    type Aggregate = Cart;

    fn aggregate_id(&self) -> AggregateId {
        self.cart_id
    }
}

/// Command issued when a shopper presses "Add to Cart".
#[derive(Debug, Clone)]
pub struct AddToCart {
    pub cart_id: AggregateId,
    pub item_id: CatalogItemId,
}

impl AddToCart {
    pub fn new(cart_id: AggregateId, item_id: impl Into<CatalogItemId>) -> Self {
        Self {
            cart_id,
            item_id: item_id.into(),
        }
    }
}

impl Command for AddToCart {
    type Aggregate = Cart;

    fn aggregate_id(&self) -> AggregateId {
        self.cart_id
    }
}

/// Command issued when a session ends; the cart is discarded.
#[derive(Debug, Clone)]
pub struct CloseCart {
    pub cart_id: AggregateId,
}

impl CloseCart {
    pub fn new(cart_id: AggregateId) -> Self {
        Self { cart_id }
    }
}

impl Command for CloseCart {
    type Aggregate = Cart;

    fn aggregate_id(&self) -> AggregateId {
        self.cart_id
    }
}
