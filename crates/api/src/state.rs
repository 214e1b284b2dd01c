//! Shared application state and the session registry.

use std::collections::HashMap;
use std::sync::Arc;

use common::AggregateId;
use domain::{CartService, Catalog, NavigationCommand, NavigationState};
use event_store::EventStore;
use projections::{ButtonFeedbackView, CartBadgeView, CartContentsView, ProjectionProcessor};
use tokio::sync::RwLock;

/// Shared application state accessible from all handlers.
pub struct AppState<S: EventStore> {
    pub cart_service: CartService<S>,
    pub catalog: Arc<Catalog>,
    pub sessions: SessionRegistry,
    pub cart_badge: CartBadgeView,
    pub cart_contents: CartContentsView,
    pub button_feedback: ButtonFeedbackView,
    pub event_store: S,
    pub projection_processor: Arc<ProjectionProcessor<S>>,
}

/// Live storefront sessions and their navigation menu state.
///
/// A session id doubles as the id of the session's cart aggregate.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<AggregateId, NavigationState>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session with its menu closed.
    pub async fn open(&self, session_id: AggregateId) {
        self.sessions
            .write()
            .await
            .insert(session_id, NavigationState::default());
    }

    /// Removes a session, returning false if it did not exist.
    pub async fn close(&self, session_id: AggregateId) -> bool {
        self.sessions.write().await.remove(&session_id).is_some()
    }

    pub async fn contains(&self, session_id: AggregateId) -> bool {
        self.sessions.read().await.contains_key(&session_id)
    }

    pub async fn navigation(&self, session_id: AggregateId) -> Option<NavigationState> {
        self.sessions.read().await.get(&session_id).copied()
    }

    /// Applies a menu command, returning the new state or None for an unknown session.
    pub async fn navigate(
        &self,
        session_id: AggregateId,
        command: NavigationCommand,
    ) -> Option<NavigationState> {
        let mut sessions = self.sessions.write().await;
        let state = sessions.get_mut(&session_id)?;
        *state = state.handle(command);
        Some(*state)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
