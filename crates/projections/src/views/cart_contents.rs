//! Cart contents read model: what the cart page lists.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{AggregateId, CatalogItemId};
use domain::{CartEvent, Money};
use event_store::EventEnvelope;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::Result;
use crate::projection::{Projection, ProjectionPosition, decode_cart_event};
use crate::read_model::ReadModel;

/// One line of a cart as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineSummary {
    pub item_id: CatalogItemId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub line_total: Money,
}

/// A cart's lines, in first-add order, with totals.
#[derive(Debug, Clone, Serialize)]
pub struct CartContents {
    pub cart_id: AggregateId,
    pub lines: Vec<CartLineSummary>,
    pub total_quantity: u64,
    pub subtotal: Money,
    pub opened_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartContents {
    fn empty(cart_id: AggregateId, opened_at: DateTime<Utc>) -> Self {
        Self {
            cart_id,
            lines: Vec::new(),
            total_quantity: 0,
            subtotal: Money::zero(),
            opened_at,
            updated_at: opened_at,
        }
    }

    fn recalculate_totals(&mut self) {
        for line in &mut self.lines {
            line.line_total = line.unit_price.multiply(line.quantity);
        }
        self.total_quantity = self.lines.iter().map(|l| u64::from(l.quantity)).sum();
        self.subtotal = self.lines.iter().map(|l| l.line_total).sum();
    }
}

#[derive(Default)]
struct ContentsState {
    carts: HashMap<AggregateId, CartContents>,
    position: ProjectionPosition,
}

/// Read model of every open cart's lines.
#[derive(Clone, Default)]
pub struct CartContentsView {
    state: Arc<RwLock<ContentsState>>,
}

impl CartContentsView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the contents of a cart.
    pub async fn get_cart(&self, cart_id: AggregateId) -> Option<CartContents> {
        self.state.read().await.carts.get(&cart_id).cloned()
    }

    /// Gets one line of a cart.
    pub async fn get_line(
        &self,
        cart_id: AggregateId,
        item_id: CatalogItemId,
    ) -> Option<CartLineSummary> {
        self.state
            .read()
            .await
            .carts
            .get(&cart_id)?
            .lines
            .iter()
            .find(|l| l.item_id == item_id)
            .cloned()
    }
}

#[async_trait]
impl Projection for CartContentsView {
    fn name(&self) -> &'static str {
        "CartContentsView"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.position.is_behind(event.sequence) {
            return Ok(());
        }

        if let Some(cart_event) = decode_cart_event(event)? {
            let cart_id = event.aggregate_id;
            match cart_event {
                CartEvent::CartOpened(data) => {
                    state
                        .carts
                        .insert(cart_id, CartContents::empty(cart_id, data.opened_at));
                }
                CartEvent::LineAdded(data) => {
                    if let Some(cart) = state.carts.get_mut(&cart_id) {
                        cart.lines.push(CartLineSummary {
                            item_id: data.item_id,
                            name: data.item_name,
                            unit_price: data.unit_price,
                            quantity: 1,
                            line_total: data.unit_price,
                        });
                        cart.recalculate_totals();
                        cart.updated_at = event.timestamp;
                    }
                }
                CartEvent::LineQuantityIncremented(data) => {
                    if let Some(cart) = state.carts.get_mut(&cart_id) {
                        if let Some(line) = cart.lines.iter_mut().find(|l| l.item_id == data.item_id)
                        {
                            line.quantity = data.new_quantity;
                        }
                        cart.recalculate_totals();
                        cart.updated_at = event.timestamp;
                    }
                }
            }
        }

        state.position = ProjectionPosition::at(event.sequence);
        Ok(())
    }

    async fn position(&self) -> ProjectionPosition {
        self.state.read().await.position
    }

    async fn forget(&self, aggregate_id: AggregateId) -> Result<()> {
        self.state.write().await.carts.remove(&aggregate_id);
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        *self.state.write().await = ContentsState::default();
        Ok(())
    }
}

impl ReadModel for CartContentsView {
    fn name(&self) -> &'static str {
        "CartContentsView"
    }

    fn count(&self) -> usize {
        self.state.try_read().map(|s| s.carts.len()).unwrap_or(0)
    }
}
