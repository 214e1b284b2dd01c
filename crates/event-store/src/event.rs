//! Stored events and their ordering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AggregateId;

/// Identity of a single stored event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Position of an event within its aggregate's stream.
///
/// A cart that has never been opened sits at version 0; its `CartOpened`
/// event is version 1 and every later event increments by one. Appends
/// carry an expected version for optimistic concurrency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Version of an aggregate with no events.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Version carried by an aggregate's first event.
    pub fn first() -> Self {
        Self(1)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A serialized domain event plus what the store knows about it.
///
/// `version` orders events within one aggregate. `sequence` orders events
/// across the whole store; it is assigned on append and stays stable when
/// other aggregates are discarded, so projections use it as their cursor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: EventId,

    /// Global position in the store. Zero until the envelope is appended.
    #[serde(default)]
    pub sequence: u64,

    /// Event name, e.g. "CartOpened" or "LineAdded".
    pub event_type: String,

    pub aggregate_id: AggregateId,

    /// Aggregate name, e.g. "Cart". Projections skip types they do not know.
    pub aggregate_type: String,

    /// The aggregate's version after this event.
    pub version: Version,

    pub timestamp: DateTime<Utc>,

    pub payload: serde_json::Value,
}

impl EventEnvelope {
    pub fn builder() -> EventEnvelopeBuilder {
        EventEnvelopeBuilder::default()
    }
}

/// Builder for [`EventEnvelope`].
#[derive(Debug, Default)]
pub struct EventEnvelopeBuilder {
    event_type: Option<String>,
    aggregate_id: Option<AggregateId>,
    aggregate_type: Option<String>,
    version: Option<Version>,
    timestamp: Option<DateTime<Utc>>,
    payload: Option<serde_json::Value>,
}

impl EventEnvelopeBuilder {
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn aggregate_id(mut self, id: AggregateId) -> Self {
        self.aggregate_id = Some(id);
        self
    }

    pub fn aggregate_type(mut self, aggregate_type: impl Into<String>) -> Self {
        self.aggregate_type = Some(aggregate_type.into());
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Overrides the recording time, which otherwise is the time of `build`.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Serializes `payload` into the envelope.
    pub fn payload<T: Serialize>(mut self, payload: &T) -> Result<Self, serde_json::Error> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    pub fn payload_raw(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Returns `None` unless event type, aggregate id, aggregate type,
    /// version and payload were all set.
    pub fn try_build(self) -> Option<EventEnvelope> {
        Some(EventEnvelope {
            event_id: EventId::new(),
            sequence: 0,
            event_type: self.event_type?,
            aggregate_id: self.aggregate_id?,
            aggregate_type: self.aggregate_type?,
            version: self.version?,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            payload: self.payload?,
        })
    }

    /// # Panics
    ///
    /// Panics if a required field is missing; see [`try_build`](Self::try_build).
    pub fn build(self) -> EventEnvelope {
        self.try_build()
            .expect("event_type, aggregate_id, aggregate_type, version and payload are required")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_count_up_from_initial() {
        assert_eq!(Version::initial().as_i64(), 0);
        assert_eq!(Version::initial().next(), Version::first());
        assert!(Version::first() < Version::new(2));
        assert_eq!(Version::new(7).to_string(), "7");
    }

    #[test]
    fn builder_leaves_sequence_unassigned() {
        let cart_id = AggregateId::new();
        let payload = serde_json::json!({"item_id": 1});

        let envelope = EventEnvelope::builder()
            .event_type("LineAdded")
            .aggregate_id(cart_id)
            .aggregate_type("Cart")
            .version(Version::new(2))
            .payload_raw(payload.clone())
            .build();

        assert_eq!(envelope.event_type, "LineAdded");
        assert_eq!(envelope.aggregate_id, cart_id);
        assert_eq!(envelope.aggregate_type, "Cart");
        assert_eq!(envelope.version, Version::new(2));
        assert_eq!(envelope.payload, payload);
        assert_eq!(envelope.sequence, 0);
    }

    #[test]
    fn explicit_timestamp_is_kept() {
        let at = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let envelope = EventEnvelope::builder()
            .event_type("CartOpened")
            .aggregate_id(AggregateId::new())
            .aggregate_type("Cart")
            .version(Version::first())
            .timestamp(at)
            .payload_raw(serde_json::json!({}))
            .build();
        assert_eq!(envelope.timestamp, at);
    }

    #[test]
    fn try_build_returns_none_on_missing_fields() {
        assert!(EventEnvelope::builder().try_build().is_none());
        assert!(
            EventEnvelope::builder()
                .event_type("CartOpened")
                .aggregate_type("Cart")
                .try_build()
                .is_none()
        );
    }

    #[test]
    fn envelopes_without_sequence_deserialize_to_zero() {
        let json = serde_json::json!({
            "event_id": Uuid::new_v4(),
            "event_type": "CartOpened",
            "aggregate_id": Uuid::new_v4(),
            "aggregate_type": "Cart",
            "version": 1,
            "timestamp": "2024-05-01T12:00:00Z",
            "payload": {}
        });
        let envelope: EventEnvelope = serde_json::from_value(json).unwrap();
        assert_eq!(envelope.sequence, 0);
    }
}
