//! Projection processor for feeding events to projections.

use common::AggregateId;
use event_store::EventStore;
use futures_util::StreamExt;
use tokio::sync::Mutex;

use crate::Result;
use crate::projection::Projection;

/// Processes events from an event store and delivers them to projections.
///
/// The processor supports:
/// - Catch-up: streams events past the slowest projection's position
/// - Rebuild: resets all projections and replays from scratch
/// - Forgetting: drops an ended session's cart from every view
///
/// Catch-up, rebuild and forgetting hold one delivery lock, so a cart is
/// never forgotten while a catch-up is still delivering its events.
pub struct ProjectionProcessor<S: EventStore> {
    store: S,
    projections: Vec<Box<dyn Projection>>,
    delivery: Mutex<()>,
}

impl<S: EventStore> ProjectionProcessor<S> {
    /// Creates a new processor with the given event store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            projections: Vec::new(),
            delivery: Mutex::new(()),
        }
    }

    /// Registers a projection with this processor.
    pub fn register(&mut self, projection: Box<dyn Projection>) {
        self.projections.push(projection);
    }

    /// Returns the number of registered projections.
    pub fn projection_count(&self) -> usize {
        self.projections.len()
    }

    /// Runs catch-up processing and returns the number of events delivered.
    ///
    /// Streaming starts after the lowest position among the registered
    /// projections; each projection skips events it has already consumed.
    #[tracing::instrument(skip(self))]
    pub async fn run_catch_up(&self) -> Result<u64> {
        let _delivery = self.delivery.lock().await;
        self.catch_up().await
    }

    async fn catch_up(&self) -> Result<u64> {
        let Some(from) = self.lowest_position().await else {
            return Ok(0);
        };

        let mut stream = self.store.stream_events_after(from).await?;
        let mut delivered: u64 = 0;

        while let Some(result) = stream.next().await {
            let event = result?;
            for projection in &self.projections {
                if projection.position().await.is_behind(event.sequence) {
                    projection.handle(&event).await?;
                    metrics::counter!("projections_events_processed").increment(1);
                }
            }
            delivered += 1;
        }

        if delivered > 0 {
            tracing::debug!(from, events = delivered, "catch-up complete");
        }

        Ok(delivered)
    }

    /// Removes an aggregate from every projection.
    #[tracing::instrument(skip(self))]
    pub async fn forget_aggregate(&self, aggregate_id: AggregateId) -> Result<()> {
        let _delivery = self.delivery.lock().await;
        for projection in &self.projections {
            projection.forget(aggregate_id).await?;
        }
        Ok(())
    }

    /// Resets all projections and replays all events from the store.
    #[tracing::instrument(skip(self))]
    pub async fn rebuild_all(&self) -> Result<u64> {
        let _delivery = self.delivery.lock().await;
        for projection in &self.projections {
            projection.reset().await?;
        }
        let replayed = self.catch_up().await?;
        tracing::info!(
            projections = self.projections.len(),
            events = replayed,
            "projections rebuilt"
        );
        Ok(replayed)
    }

    async fn lowest_position(&self) -> Option<u64> {
        let mut lowest = None;
        for projection in &self.projections {
            let seq = projection.position().await.last_sequence;
            lowest = Some(lowest.map_or(seq, |l: u64| l.min(seq)));
        }
        lowest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::ProjectionPosition;
    use async_trait::async_trait;
    use event_store::{AppendOptions, EventEnvelope, InMemoryEventStore, Version};
    use std::collections::HashSet;
    use std::sync::Arc;
    use tokio::sync::{RwLock, Semaphore, mpsc};

    /// Counts events and remembers which aggregates it has seen.
    struct CountingProjection {
        count: Arc<RwLock<u64>>,
        seen: Arc<RwLock<HashSet<AggregateId>>>,
        position: Arc<RwLock<ProjectionPosition>>,
    }

    impl CountingProjection {
        fn new() -> Self {
            Self {
                count: Arc::new(RwLock::new(0)),
                seen: Arc::new(RwLock::new(HashSet::new())),
                position: Arc::new(RwLock::new(ProjectionPosition::zero())),
            }
        }
    }

    #[async_trait]
    impl Projection for CountingProjection {
        fn name(&self) -> &'static str {
            "CountingProjection"
        }

        async fn handle(&self, event: &EventEnvelope) -> Result<()> {
            let mut pos = self.position.write().await;
            if !pos.is_behind(event.sequence) {
                return Ok(());
            }
            *self.count.write().await += 1;
            self.seen.write().await.insert(event.aggregate_id);
            *pos = ProjectionPosition::at(event.sequence);
            Ok(())
        }

        async fn position(&self) -> ProjectionPosition {
            *self.position.read().await
        }

        async fn forget(&self, aggregate_id: AggregateId) -> Result<()> {
            self.seen.write().await.remove(&aggregate_id);
            Ok(())
        }

        async fn reset(&self) -> Result<()> {
            *self.count.write().await = 0;
            self.seen.write().await.clear();
            *self.position.write().await = ProjectionPosition::zero();
            Ok(())
        }
    }

    /// Wraps a counting projection and parks in `handle` until released.
    struct GatedProjection {
        inner: CountingProjection,
        entered: mpsc::UnboundedSender<u64>,
        release: Arc<Semaphore>,
    }

    #[async_trait]
    impl Projection for GatedProjection {
        fn name(&self) -> &'static str {
            "GatedProjection"
        }

        async fn handle(&self, event: &EventEnvelope) -> Result<()> {
            let _ = self.entered.send(event.sequence);
            if let Ok(permit) = self.release.acquire().await {
                permit.forget();
            }
            self.inner.handle(event).await
        }

        async fn position(&self) -> ProjectionPosition {
            self.inner.position().await
        }

        async fn forget(&self, aggregate_id: AggregateId) -> Result<()> {
            self.inner.forget(aggregate_id).await
        }

        async fn reset(&self) -> Result<()> {
            self.inner.reset().await
        }
    }

    fn create_test_event(aggregate_id: AggregateId, version: i64) -> EventEnvelope {
        EventEnvelope::builder()
            .aggregate_id(aggregate_id)
            .aggregate_type("Cart")
            .event_type("TestEvent")
            .version(Version::new(version))
            .payload_raw(serde_json::json!({"test": true}))
            .build()
    }

    async fn store_with_events(aggregate_id: AggregateId, n: i64) -> InMemoryEventStore {
        let store = InMemoryEventStore::new();
        let events = (1..=n).map(|v| create_test_event(aggregate_id, v)).collect();
        store.append(events, AppendOptions::new()).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_catch_up_processes_all_events() {
        let store = store_with_events(AggregateId::new(), 3).await;

        let projection = CountingProjection::new();
        let count_ref = Arc::clone(&projection.count);
        let pos_ref = Arc::clone(&projection.position);
        let mut processor = ProjectionProcessor::new(store);
        processor.register(Box::new(projection));

        assert_eq!(processor.run_catch_up().await.unwrap(), 3);
        assert_eq!(*count_ref.read().await, 3);
        assert_eq!(pos_ref.read().await.last_sequence, 3);
    }

    #[tokio::test]
    async fn test_rebuild_resets_and_replays() {
        let store = store_with_events(AggregateId::new(), 2).await;

        let projection = CountingProjection::new();
        let count_ref = Arc::clone(&projection.count);
        let pos_ref = Arc::clone(&projection.position);

        let mut processor = ProjectionProcessor::new(store);
        processor.register(Box::new(projection));

        processor.run_catch_up().await.unwrap();
        assert_eq!(*count_ref.read().await, 2);

        assert_eq!(processor.rebuild_all().await.unwrap(), 2);
        assert_eq!(*count_ref.read().await, 2);
        assert_eq!(pos_ref.read().await.last_sequence, 2);
    }

    #[tokio::test]
    async fn test_catch_up_skips_already_processed() {
        let agg_id = AggregateId::new();
        let store = store_with_events(agg_id, 3).await;

        let projection = CountingProjection::new();
        let count_ref = Arc::clone(&projection.count);

        let mut processor = ProjectionProcessor::new(store.clone());
        processor.register(Box::new(projection));

        processor.run_catch_up().await.unwrap();
        assert_eq!(processor.run_catch_up().await.unwrap(), 0);
        assert_eq!(*count_ref.read().await, 3);

        store
            .append(
                vec![create_test_event(agg_id, 4)],
                AppendOptions::expect_version(Version::new(3)),
            )
            .await
            .unwrap();
        assert_eq!(processor.run_catch_up().await.unwrap(), 1);
        assert_eq!(*count_ref.read().await, 4);
    }

    #[tokio::test]
    async fn test_late_projection_catches_up_alone() {
        let store = store_with_events(AggregateId::new(), 2).await;

        let early = CountingProjection::new();
        let early_count = Arc::clone(&early.count);
        let mut processor = ProjectionProcessor::new(store);
        processor.register(Box::new(early));
        processor.run_catch_up().await.unwrap();

        let late = CountingProjection::new();
        let late_count = Arc::clone(&late.count);
        processor.register(Box::new(late));
        processor.run_catch_up().await.unwrap();

        assert_eq!(*early_count.read().await, 2);
        assert_eq!(*late_count.read().await, 2);
    }

    #[tokio::test]
    async fn test_empty_store_catch_up() {
        let store = InMemoryEventStore::new();
        let projection = CountingProjection::new();
        let count_ref = Arc::clone(&projection.count);

        let mut processor = ProjectionProcessor::new(store);
        processor.register(Box::new(projection));

        assert_eq!(processor.run_catch_up().await.unwrap(), 0);
        assert_eq!(*count_ref.read().await, 0);
    }

    #[tokio::test]
    async fn test_no_projections_is_a_no_op() {
        let store = store_with_events(AggregateId::new(), 2).await;
        let processor = ProjectionProcessor::new(store);
        assert_eq!(processor.projection_count(), 0);
        assert_eq!(processor.run_catch_up().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_forget_reaches_every_projection() {
        let agg_id = AggregateId::new();
        let store = store_with_events(agg_id, 1).await;

        let proj1 = CountingProjection::new();
        let proj2 = CountingProjection::new();
        let seen1 = Arc::clone(&proj1.seen);
        let seen2 = Arc::clone(&proj2.seen);

        let mut processor = ProjectionProcessor::new(store);
        processor.register(Box::new(proj1));
        processor.register(Box::new(proj2));
        processor.run_catch_up().await.unwrap();
        assert!(seen1.read().await.contains(&agg_id));

        processor.forget_aggregate(agg_id).await.unwrap();

        assert!(seen1.read().await.is_empty());
        assert!(seen2.read().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_forget_waits_for_running_catch_up() {
        let cart_id = AggregateId::new();
        let store = store_with_events(cart_id, 2).await;

        let inner = CountingProjection::new();
        let seen = Arc::clone(&inner.seen);
        let (entered, mut entered_rx) = mpsc::unbounded_channel();
        let release = Arc::new(Semaphore::new(0));

        let mut processor = ProjectionProcessor::new(store.clone());
        processor.register(Box::new(GatedProjection {
            inner,
            entered,
            release: Arc::clone(&release),
        }));
        let processor = Arc::new(processor);

        let catch_up = tokio::spawn({
            let processor = Arc::clone(&processor);
            async move { processor.run_catch_up().await }
        });
        assert_eq!(entered_rx.recv().await, Some(1));

        // The session ends while its events are still being delivered.
        store.discard_aggregate(cart_id).await.unwrap();
        let forget = tokio::spawn({
            let processor = Arc::clone(&processor);
            async move { processor.forget_aggregate(cart_id).await }
        });
        tokio::task::yield_now().await;

        release.add_permits(2);
        assert_eq!(catch_up.await.unwrap().unwrap(), 2);
        forget.await.unwrap().unwrap();

        assert!(!seen.read().await.contains(&cart_id));
        assert_eq!(processor.run_catch_up().await.unwrap(), 0);
    }
}
