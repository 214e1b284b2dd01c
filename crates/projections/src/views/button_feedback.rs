//! "Added!" feedback on the add-to-cart buttons.
//!
//! After an add, the item's button reads "Added!" for a short window and then
//! reverts. The view only remembers when each item was last added; the label
//! is derived from that timestamp at query time, so no timer is involved.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use common::{AggregateId, CatalogItemId};
use domain::CartEvent;
use event_store::EventEnvelope;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::Result;
use crate::projection::{Projection, ProjectionPosition, decode_cart_event};
use crate::read_model::ReadModel;

/// Default time the "Added!" label stays up, in milliseconds.
pub const DEFAULT_REVERT_MS: i64 = 1500;

/// Text on an item's add-to-cart button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ButtonLabel {
    #[serde(rename = "Add to Cart")]
    AddToCart,
    #[serde(rename = "Added!")]
    Added,
}

impl ButtonLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonLabel::AddToCart => "Add to Cart",
            ButtonLabel::Added => "Added!",
        }
    }
}

impl std::fmt::Display for ButtonLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Default)]
struct FeedbackState {
    last_added: HashMap<(AggregateId, CatalogItemId), DateTime<Utc>>,
    position: ProjectionPosition,
}

/// Tracks the last add time of every (cart, item) pair.
#[derive(Clone)]
pub struct ButtonFeedbackView {
    state: Arc<RwLock<FeedbackState>>,
    revert_after: TimeDelta,
}

impl ButtonFeedbackView {
    pub fn new() -> Self {
        Self::with_revert_window(TimeDelta::milliseconds(DEFAULT_REVERT_MS))
    }

    pub fn with_revert_window(revert_after: TimeDelta) -> Self {
        Self {
            state: Arc::new(RwLock::new(FeedbackState::default())),
            revert_after,
        }
    }

    pub fn revert_window(&self) -> TimeDelta {
        self.revert_after
    }

    /// When the item was last added to the cart, if ever.
    pub async fn last_added(
        &self,
        cart_id: AggregateId,
        item_id: CatalogItemId,
    ) -> Option<DateTime<Utc>> {
        self.state
            .read()
            .await
            .last_added
            .get(&(cart_id, item_id))
            .copied()
    }

    /// The button label as of `now`.
    ///
    /// Each add restarts the window, so the label reverts one window after
    /// the most recent add of that item.
    pub async fn label(
        &self,
        cart_id: AggregateId,
        item_id: CatalogItemId,
        now: DateTime<Utc>,
    ) -> ButtonLabel {
        match self.last_added(cart_id, item_id).await {
            Some(at) if now.signed_duration_since(at) < self.revert_after => ButtonLabel::Added,
            _ => ButtonLabel::AddToCart,
        }
    }
}

impl Default for ButtonFeedbackView {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Projection for ButtonFeedbackView {
    fn name(&self) -> &'static str {
        "ButtonFeedbackView"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.position.is_behind(event.sequence) {
            return Ok(());
        }

        match decode_cart_event(event)? {
            Some(CartEvent::LineAdded(data)) => {
                state
                    .last_added
                    .insert((event.aggregate_id, data.item_id), event.timestamp);
            }
            Some(CartEvent::LineQuantityIncremented(data)) => {
                state
                    .last_added
                    .insert((event.aggregate_id, data.item_id), event.timestamp);
            }
            Some(CartEvent::CartOpened(_)) | None => {}
        }

        state.position = ProjectionPosition::at(event.sequence);
        Ok(())
    }

    async fn position(&self) -> ProjectionPosition {
        self.state.read().await.position
    }

    async fn forget(&self, aggregate_id: AggregateId) -> Result<()> {
        self.state
            .write()
            .await
            .last_added
            .retain(|(cart_id, _), _| *cart_id != aggregate_id);
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        *self.state.write().await = FeedbackState::default();
        Ok(())
    }
}

impl ReadModel for ButtonFeedbackView {
    fn name(&self) -> &'static str {
        "ButtonFeedbackView"
    }

    fn count(&self) -> usize {
        self.state
            .try_read()
            .map(|s| {
                s.last_added
                    .keys()
                    .map(|(cart_id, _)| *cart_id)
                    .collect::<HashSet<_>>()
                    .len()
            })
            .unwrap_or(0)
    }
}
