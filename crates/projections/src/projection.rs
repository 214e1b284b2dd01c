//! Core projection trait and position tracking.

use async_trait::async_trait;
use common::AggregateId;
use domain::{Aggregate, Cart, CartEvent};
use event_store::EventEnvelope;

use crate::Result;

/// The last store sequence number a projection has consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProjectionPosition {
    pub last_sequence: u64,
}

impl ProjectionPosition {
    /// Creates a position before the first event.
    pub fn zero() -> Self {
        Self { last_sequence: 0 }
    }

    pub fn at(sequence: u64) -> Self {
        Self {
            last_sequence: sequence,
        }
    }

    /// Returns true if the event at `sequence` has not been consumed yet.
    pub fn is_behind(&self, sequence: u64) -> bool {
        sequence > self.last_sequence
    }
}

impl std::fmt::Display for ProjectionPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "position({})", self.last_sequence)
    }
}

/// A projection that folds stored events into a read model.
///
/// `handle` must be idempotent: an event at or before the current position
/// is ignored, so catch-up can safely be re-run.
#[async_trait]
pub trait Projection: Send + Sync {
    /// Returns the name of this projection.
    fn name(&self) -> &'static str;

    /// Handles a single event, updating the read model.
    async fn handle(&self, event: &EventEnvelope) -> Result<()>;

    /// Returns the current position of this projection.
    async fn position(&self) -> ProjectionPosition;

    /// Drops everything the projection knows about one aggregate.
    async fn forget(&self, aggregate_id: AggregateId) -> Result<()>;

    /// Resets the projection to its initial state.
    async fn reset(&self) -> Result<()>;
}

/// Decodes a cart event, returning None for envelopes of other aggregates.
pub(crate) fn decode_cart_event(event: &EventEnvelope) -> Result<Option<CartEvent>> {
    if event.aggregate_type != Cart::aggregate_type() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(event.payload.clone())?))
}
