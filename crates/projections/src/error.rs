//! Projection error types.

use thiserror::Error;

/// Errors that can occur while feeding events to read models.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// Reading from the event store failed.
    #[error("Event store error: {0}")]
    EventStore(#[from] event_store::EventStoreError),

    /// A cart event payload could not be decoded.
    #[error("Event deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// A projection-specific error.
    #[error("Projection {projection} failed: {message}")]
    Projection {
        projection: &'static str,
        message: String,
    },
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
