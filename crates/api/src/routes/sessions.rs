//! Session lifecycle, navigation menu and event log endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::AggregateId;
use domain::{CloseCart, NavigationCommand, NavigationState, OpenCart};
use event_store::EventStore;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub cart_count: u64,
    pub navigation: NavigationState,
}

#[derive(Serialize)]
pub struct NavigationResponse {
    pub navigation: NavigationState,
}

/// Response type for event envelope data.
#[derive(Serialize)]
pub struct EventEnvelopeResponse {
    pub event_id: String,
    pub sequence: u64,
    pub event_type: String,
    pub aggregate_id: String,
    pub version: i64,
    pub timestamp: String,
    pub payload: serde_json::Value,
}

/// POST /sessions — start a storefront session with an empty cart.
#[tracing::instrument(skip(state))]
pub async fn open<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let cmd = OpenCart::generate();
    let session_id = cmd.cart_id;
    state.cart_service.open_cart(cmd).await?;
    state.sessions.open(session_id).await;
    state.projection_processor.run_catch_up().await?;

    metrics::counter!("storefront_sessions_opened_total").increment(1);
    tracing::info!(%session_id, "session opened");

    let response = SessionResponse {
        session_id: session_id.to_string(),
        cart_count: state.cart_badge.count_for(session_id).await.unwrap_or(0),
        navigation: NavigationState::default(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// DELETE /sessions/{id} — end a session and discard its cart.
#[tracing::instrument(skip(state))]
pub async fn close<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session_id = require_session(&state, &id).await?;

    state
        .cart_service
        .close_cart(CloseCart::new(session_id))
        .await?;
    state
        .projection_processor
        .forget_aggregate(session_id)
        .await?;
    state.sessions.close(session_id).await;

    tracing::info!(%session_id, "session closed");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /sessions/{id}/navigation/{action} — open, close or follow a menu link.
#[tracing::instrument(skip(state))]
pub async fn navigate<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, action)): Path<(String, String)>,
) -> Result<Json<NavigationResponse>, ApiError> {
    let session_id = parse_session_id(&id)?;
    let command: NavigationCommand = action.parse().map_err(ApiError::BadRequest)?;

    let navigation = state
        .sessions
        .navigate(session_id, command)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Session {id} not found")))?;

    tracing::debug!(%session_id, %navigation, "navigation changed");
    Ok(Json(NavigationResponse { navigation }))
}

/// GET /sessions/{id}/events — the session cart's event log.
#[tracing::instrument(skip(state))]
pub async fn events<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<EventEnvelopeResponse>>, ApiError> {
    let session_id = require_session(&state, &id).await?;

    let envelopes = state
        .event_store
        .get_events_for_aggregate(session_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let responses: Vec<EventEnvelopeResponse> = envelopes
        .into_iter()
        .map(|e| EventEnvelopeResponse {
            event_id: e.event_id.to_string(),
            sequence: e.sequence,
            event_type: e.event_type,
            aggregate_id: e.aggregate_id.to_string(),
            version: e.version.as_i64(),
            timestamp: e.timestamp.to_rfc3339(),
            payload: e.payload,
        })
        .collect();

    Ok(Json(responses))
}

pub(crate) fn parse_session_id(id: &str) -> Result<AggregateId, ApiError> {
    AggregateId::parse(id).map_err(|e| ApiError::BadRequest(format!("Invalid session id: {e}")))
}

/// Parses a session id and checks that the session is live.
pub(crate) async fn require_session<S: EventStore>(
    state: &Arc<AppState<S>>,
    id: &str,
) -> Result<AggregateId, ApiError> {
    let session_id = parse_session_id(id)?;
    if state.sessions.contains(session_id).await {
        Ok(session_id)
    } else {
        Err(ApiError::NotFound(format!("Session {id} not found")))
    }
}
