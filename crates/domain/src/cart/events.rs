//! Cart domain events.

use chrono::{DateTime, Utc};
use common::{AggregateId, CatalogItemId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::catalog::{CatalogItem, Money};

/// Events that can occur on a cart aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CartEvent {
    /// A session opened its cart.
    CartOpened(CartOpenedData),

    /// An item entered the cart for the first time.
    LineAdded(LineAddedData),

    /// An item already in the cart was added again.
    LineQuantityIncremented(LineQuantityIncrementedData),
}

impl DomainEvent for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::CartOpened(_) => "CartOpened",
            CartEvent::LineAdded(_) => "LineAdded",
            CartEvent::LineQuantityIncremented(_) => "LineQuantityIncremented",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartOpenedData {
    pub cart_id: AggregateId,
    pub opened_at: DateTime<Utc>,
}

/// Data for LineAdded. Name and price are copied from the catalog so the
/// read side can describe the line without a catalog of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineAddedData {
    pub item_id: CatalogItemId,
    pub item_name: String,
    pub unit_price: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineQuantityIncrementedData {
    pub item_id: CatalogItemId,
    pub old_quantity: u32,
    pub new_quantity: u32,
}

impl CartEvent {
    pub fn cart_opened(cart_id: AggregateId) -> Self {
        CartEvent::CartOpened(CartOpenedData {
            cart_id,
            opened_at: Utc::now(),
        })
    }

    pub fn line_added(item: &CatalogItem) -> Self {
        CartEvent::LineAdded(LineAddedData {
            item_id: item.id(),
            item_name: item.name().to_string(),
            unit_price: item.unit_price(),
        })
    }

    pub fn line_quantity_incremented(
        item_id: CatalogItemId,
        old_quantity: u32,
        new_quantity: u32,
    ) -> Self {
        CartEvent::LineQuantityIncremented(LineQuantityIncrementedData {
            item_id,
            old_quantity,
            new_quantity,
        })
    }

    /// The catalog item this event concerns, if any.
    pub fn item_id(&self) -> Option<CatalogItemId> {
        match self {
            CartEvent::CartOpened(_) => None,
            CartEvent::LineAdded(data) => Some(data.item_id),
            CartEvent::LineQuantityIncremented(data) => Some(data.item_id),
        }
    }
}
