//! Cart badge read model: the counter shown next to the cart icon.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::AggregateId;
use domain::CartEvent;
use event_store::EventEnvelope;
use tokio::sync::RwLock;

use crate::Result;
use crate::projection::{Projection, ProjectionPosition, decode_cart_event};
use crate::read_model::ReadModel;

#[derive(Default)]
struct BadgeState {
    counts: HashMap<AggregateId, u64>,
    position: ProjectionPosition,
}

/// Running total quantity per cart.
#[derive(Clone, Default)]
pub struct CartBadgeView {
    state: Arc<RwLock<BadgeState>>,
}

impl CartBadgeView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the badge count of a cart, or None if the cart is unknown.
    pub async fn count_for(&self, cart_id: AggregateId) -> Option<u64> {
        self.state.read().await.counts.get(&cart_id).copied()
    }

    /// Sum of all badges, i.e. items sitting in any open cart.
    pub async fn total_items(&self) -> u64 {
        self.state.read().await.counts.values().sum()
    }
}

#[async_trait]
impl Projection for CartBadgeView {
    fn name(&self) -> &'static str {
        "CartBadgeView"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.position.is_behind(event.sequence) {
            return Ok(());
        }

        if let Some(cart_event) = decode_cart_event(event)? {
            let cart_id = event.aggregate_id;
            match cart_event {
                CartEvent::CartOpened(_) => {
                    state.counts.insert(cart_id, 0);
                }
                CartEvent::LineAdded(_) | CartEvent::LineQuantityIncremented(_) => {
                    if let Some(count) = state.counts.get_mut(&cart_id) {
                        *count += 1;
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
        self.state.write().await.counts.remove(&aggregate_id);
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        *self.state.write().await = BadgeState::default();
        Ok(())
    }
}

impl ReadModel for CartBadgeView {
    fn name(&self) -> &'static str {
        "CartBadgeView"
    }

    fn count(&self) -> usize {
        self.state.try_read().map(|s| s.counts.len()).unwrap_or(0)
    }
}
