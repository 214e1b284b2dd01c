//! Cart aggregate implementation.

use chrono::{DateTime, Utc};
use common::{AggregateId, CatalogItemId};
use event_store::Version;

use crate::aggregate::Aggregate;
use crate::catalog::{Catalog, Money};

use super::{
    CartError, CartEvent, CartLine,
    events::{LineAddedData, LineQuantityIncrementedData},
};

/// Cart aggregate root.
///
/// Lines are kept in first-add order and there is at most one line per
/// catalog item. Quantities only ever grow.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    id: Option<AggregateId>,
    version: Version,
    opened_at: Option<DateTime<Utc>>,
    lines: Vec<CartLine>,
}

impl Aggregate for Cart {
    type Event = CartEvent;
    type Error = CartError;

    fn aggregate_type() -> &'static str {
        "Cart"
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            CartEvent::CartOpened(data) => {
                self.id = Some(data.cart_id);
                self.opened_at = Some(data.opened_at);
            }
            CartEvent::LineAdded(data) => self.apply_line_added(data),
            CartEvent::LineQuantityIncremented(data) => self.apply_quantity_incremented(data),
        }
    }
}

// Query methods
impl Cart {
    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        self.opened_at
    }

    /// Lines in first-add order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, item_id: CatalogItemId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.item_id() == item_id)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of quantities across all lines; 0 for an empty cart.
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity())).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Price of the cart's contents at current catalog prices.
    pub fn subtotal(&self, catalog: &Catalog) -> Money {
        self.lines
            .iter()
            .filter_map(|line| {
                catalog
                    .get(line.item_id())
                    .map(|item| item.unit_price().multiply(line.quantity()))
            })
            .sum()
    }
}

// Command methods (return events)
impl Cart {
    /// Opens the cart for a session.
    pub fn open(&self, cart_id: AggregateId) -> Result<Vec<CartEvent>, CartError> {
        if self.id.is_some() {
            return Err(CartError::AlreadyOpened);
        }

        Ok(vec![CartEvent::cart_opened(cart_id)])
    }

    /// Adds one unit of a catalog item.
    ///
    /// Increments the existing line if the item is already in the cart,
    /// otherwise appends a new line with quantity 1. Identifiers missing from
    /// the catalog are rejected with [`CartError::UnknownItem`].
    pub fn add(
        &self,
        catalog: &Catalog,
        item_id: CatalogItemId,
    ) -> Result<Vec<CartEvent>, CartError> {
        if self.id.is_none() {
            return Err(CartError::NotOpened);
        }

        let item = catalog
            .get(item_id)
            .ok_or(CartError::UnknownItem { item_id })?;

        match self.line(item_id) {
            Some(existing) => {
                let new_quantity = existing
                    .quantity()
                    .checked_add(1)
                    .ok_or(CartError::QuantityOverflow { item_id })?;
                Ok(vec![CartEvent::line_quantity_incremented(
                    item_id,
                    existing.quantity(),
                    new_quantity,
                )])
            }
            None => Ok(vec![CartEvent::line_added(item)]),
        }
    }
}

// Apply event helpers
impl Cart {
    fn apply_line_added(&mut self, data: LineAddedData) {
        if self.line(data.item_id).is_none() {
            self.lines.push(CartLine::first(data.item_id));
        }
    }

    fn apply_quantity_incremented(&mut self, data: LineQuantityIncrementedData) {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.item_id() == data.item_id)
        {
            line.set_quantity(data.new_quantity);
        }
    }
}
