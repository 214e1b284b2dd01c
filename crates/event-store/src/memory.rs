use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    AggregateId, EventEnvelope, EventStoreError, Result, Version,
    store::{AppendOptions, EventStore, EventStream, validate_events_for_append},
};

#[derive(Default)]
struct Inner {
    events: Vec<EventEnvelope>,
    last_sequence: u64,
}

/// In-memory event store.
///
/// Holds every session's cart stream for the lifetime of the process.
/// Cloning is cheap and yields a handle onto the same storage.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryEventStore {
    /// Creates a new empty in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events stored.
    pub async fn event_count(&self) -> usize {
        self.inner.read().await.events.len()
    }

    /// Returns the sequence number of the most recent append.
    pub async fn last_sequence(&self) -> u64 {
        self.inner.read().await.last_sequence
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(
        &self,
        mut events: Vec<EventEnvelope>,
        options: AppendOptions,
    ) -> Result<Version> {
        validate_events_for_append(&events)?;

        let aggregate_id = events[0].aggregate_id;
        let first_new_version = events[0].version;

        let mut inner = self.inner.write().await;

        let current_version = inner
            .events
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .map(|e| e.version)
            .max()
            .unwrap_or(Version::initial());

        if let Some(expected) = options.expected_version
            && current_version != expected
        {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual: current_version,
            });
        }

        // Unique (aggregate, version) constraint.
        if first_new_version <= current_version {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected: options.expected_version.unwrap_or(current_version),
                actual: current_version,
            });
        }

        for event in &mut events {
            inner.last_sequence += 1;
            event.sequence = inner.last_sequence;
        }

        let last_version = events
            .last()
            .map(|e| e.version)
            .unwrap_or(current_version);
        tracing::debug!(
            %aggregate_id,
            count = events.len(),
            version = %last_version,
            "appended events"
        );
        inner.events.extend(events);

        Ok(last_version)
    }

    async fn get_events_for_aggregate(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<Vec<EventEnvelope>> {
        let inner = self.inner.read().await;
        let mut events: Vec<_> = inner
            .events
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.version);
        Ok(events)
    }

    async fn get_aggregate_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>> {
        let inner = self.inner.read().await;
        Ok(inner
            .events
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .map(|e| e.version)
            .max())
    }

    async fn stream_events_after(&self, after: u64) -> Result<EventStream> {
        use futures_util::stream;

        // Events are stored in append order, which is sequence order.
        let events: Vec<_> = self
            .inner
            .read()
            .await
            .events
            .iter()
            .filter(|e| e.sequence > after)
            .cloned()
            .collect();

        Ok(Box::pin(stream::iter(events.into_iter().map(Ok))))
    }

    async fn discard_aggregate(&self, aggregate_id: AggregateId) -> Result<usize> {
        let mut inner = self.inner.write().await;
        let before = inner.events.len();
        inner.events.retain(|e| e.aggregate_id != aggregate_id);
        let removed = before - inner.events.len();

        if removed == 0 {
            return Err(EventStoreError::AggregateNotFound(aggregate_id));
        }

        tracing::debug!(%aggregate_id, removed, "discarded aggregate");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;

    use super::*;
    use crate::EventStoreExt;

    fn cart_event(cart_id: AggregateId, version: i64, event_type: &str) -> EventEnvelope {
        EventEnvelope::builder()
            .aggregate_id(cart_id)
            .aggregate_type("Cart")
            .event_type(event_type)
            .version(Version::new(version))
            .payload_raw(serde_json::json!({"test": true}))
            .build()
    }

    #[tokio::test]
    async fn append_single_event() {
        let store = InMemoryEventStore::new();
        let cart_id = AggregateId::new();

        let version = store
            .append(
                vec![cart_event(cart_id, 1, "CartOpened")],
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();
        assert_eq!(version, Version::first());

        let events = store.get_events_for_aggregate(cart_id).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].sequence, 1);
    }

    #[tokio::test]
    async fn append_assigns_increasing_sequences_across_aggregates() {
        let store = InMemoryEventStore::new();
        let a = AggregateId::new();
        let b = AggregateId::new();

        store
            .append(
                vec![cart_event(a, 1, "CartOpened"), cart_event(a, 2, "LineAdded")],
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();
        store
            .append(vec![cart_event(b, 1, "CartOpened")], AppendOptions::expect_new())
            .await
            .unwrap();

        assert_eq!(store.last_sequence().await, 3);
        let b_events = store.get_events_for_aggregate(b).await.unwrap();
        assert_eq!(b_events[0].sequence, 3);
    }

    #[tokio::test]
    async fn concurrency_conflict_on_stale_version() {
        let store = InMemoryEventStore::new();
        let cart_id = AggregateId::new();

        store
            .append(
                vec![cart_event(cart_id, 1, "CartOpened")],
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();

        let result = store
            .append(
                vec![cart_event(cart_id, 2, "LineAdded")],
                AppendOptions::expect_version(Version::initial()),
            )
            .await;

        assert!(matches!(
            result,
            Err(EventStoreError::ConcurrencyConflict { .. })
        ));
        assert_eq!(store.event_count().await, 1);
    }

    #[tokio::test]
    async fn duplicate_version_without_expectation_conflicts() {
        let store = InMemoryEventStore::new();
        let cart_id = AggregateId::new();

        store
            .append(vec![cart_event(cart_id, 1, "CartOpened")], AppendOptions::new())
            .await
            .unwrap();
        let result = store
            .append(vec![cart_event(cart_id, 1, "CartOpened")], AppendOptions::new())
            .await;

        assert!(matches!(
            result,
            Err(EventStoreError::ConcurrencyConflict { .. })
        ));
    }

    #[tokio::test]
    async fn empty_append_is_invalid() {
        let store = InMemoryEventStore::new();
        let result = store.append(vec![], AppendOptions::new()).await;
        assert!(matches!(result, Err(EventStoreError::InvalidAppend(_))));
    }

    #[tokio::test]
    async fn stream_after_skips_seen_events() {
        let store = InMemoryEventStore::new();
        let cart_id = AggregateId::new();
        store
            .append(
                vec![
                    cart_event(cart_id, 1, "CartOpened"),
                    cart_event(cart_id, 2, "LineAdded"),
                    cart_event(cart_id, 3, "LineQuantityIncremented"),
                ],
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();

        let tail: Vec<_> = store
            .stream_events_after(1)
            .await
            .unwrap()
            .map(|r| r.unwrap().event_type)
            .collect()
            .await;
        assert_eq!(tail, vec!["LineAdded", "LineQuantityIncremented"]);

        let all: Vec<_> = store.stream_events_after(0).await.unwrap().collect().await;
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn discard_removes_only_that_aggregate() {
        let store = InMemoryEventStore::new();
        let keep = AggregateId::new();
        let drop_me = AggregateId::new();

        store
            .append(vec![cart_event(keep, 1, "CartOpened")], AppendOptions::expect_new())
            .await
            .unwrap();
        store
            .append(
                vec![
                    cart_event(drop_me, 1, "CartOpened"),
                    cart_event(drop_me, 2, "LineAdded"),
                ],
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();

        let removed = store.discard_aggregate(drop_me).await.unwrap();
        assert_eq!(removed, 2);
        assert!(!store.aggregate_exists(drop_me).await.unwrap());
        assert!(store.aggregate_exists(keep).await.unwrap());
        // Sequence numbers are never reused.
        assert_eq!(store.last_sequence().await, 3);
    }

    #[tokio::test]
    async fn discard_unknown_aggregate_fails() {
        let store = InMemoryEventStore::new();
        let result = store.discard_aggregate(AggregateId::new()).await;
        assert!(matches!(result, Err(EventStoreError::AggregateNotFound(_))));
    }

    #[tokio::test]
    async fn version_is_none_for_unknown_aggregate() {
        let store = InMemoryEventStore::new();
        let version = store
            .get_aggregate_version(AggregateId::new())
            .await
            .unwrap();
        assert!(version.is_none());
    }
}
