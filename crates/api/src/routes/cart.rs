//! Cart endpoints: contents, badge count, adds and button feedback.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use common::CatalogItemId;
use domain::AddToCart;
use event_store::EventStore;
use projections::{ButtonLabel, CartLineSummary};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::sessions::require_session;
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub item_id: u32,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartLineResponse {
    pub item_id: CatalogItemId,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub line_total_cents: i64,
}

impl From<CartLineSummary> for CartLineResponse {
    fn from(line: CartLineSummary) -> Self {
        Self {
            item_id: line.item_id,
            name: line.name,
            unit_price_cents: line.unit_price.cents(),
            quantity: line.quantity,
            line_total_cents: line.line_total.cents(),
        }
    }
}

#[derive(Serialize)]
pub struct CartResponse {
    pub session_id: String,
    pub lines: Vec<CartLineResponse>,
    pub total_quantity: u64,
    pub subtotal_cents: i64,
    pub subtotal: String,
}

#[derive(Serialize)]
pub struct CartCountResponse {
    pub count: u64,
}

#[derive(Serialize)]
pub struct AddItemResponse {
    pub count: u64,
    pub item_id: CatalogItemId,
    pub quantity: u32,
    pub button_label: ButtonLabel,
}

#[derive(Serialize)]
pub struct ButtonResponse {
    pub item_id: CatalogItemId,
    pub label: ButtonLabel,
}

// -- Handlers --

/// GET /sessions/{id}/cart — lines in first-add order with totals.
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let session_id = require_session(&state, &id).await?;
    state.projection_processor.run_catch_up().await?;

    let contents = state
        .cart_contents
        .get_cart(session_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Cart for session {id} not found")))?;

    Ok(Json(CartResponse {
        session_id: session_id.to_string(),
        total_quantity: contents.total_quantity,
        subtotal_cents: contents.subtotal.cents(),
        subtotal: contents.subtotal.to_string(),
        lines: contents
            .lines
            .into_iter()
            .map(CartLineResponse::from)
            .collect(),
    }))
}

/// GET /sessions/{id}/cart/count — the cart badge.
#[tracing::instrument(skip(state))]
pub async fn count<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<CartCountResponse>, ApiError> {
    let session_id = require_session(&state, &id).await?;
    state.projection_processor.run_catch_up().await?;

    let count = state
        .cart_badge
        .count_for(session_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Cart for session {id} not found")))?;

    Ok(Json(CartCountResponse { count }))
}

/// POST /sessions/{id}/cart/items — add one unit of a catalog item.
#[tracing::instrument(skip(state, req), fields(item_id = req.item_id))]
pub async fn add_item<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<AddItemResponse>, ApiError> {
    let session_id = require_session(&state, &id).await?;
    let item_id = CatalogItemId::new(req.item_id);

    let result = state
        .cart_service
        .add_to_cart(AddToCart::new(session_id, item_id))
        .await?;
    state.projection_processor.run_catch_up().await?;

    let quantity = result
        .aggregate
        .line(item_id)
        .map(|line| line.quantity())
        .unwrap_or(0);
    let count = state
        .cart_badge
        .count_for(session_id)
        .await
        .unwrap_or_else(|| result.aggregate.total_quantity());
    let button_label = state
        .button_feedback
        .label(session_id, item_id, Utc::now())
        .await;

    Ok(Json(AddItemResponse {
        count,
        item_id,
        quantity,
        button_label,
    }))
}

/// GET /sessions/{id}/cart/items/{item_id}/button — current add-to-cart label.
#[tracing::instrument(skip(state))]
pub async fn button<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, item_id)): Path<(String, u32)>,
) -> Result<Json<ButtonResponse>, ApiError> {
    let session_id = require_session(&state, &id).await?;
    let item_id = CatalogItemId::new(item_id);
    if !state.catalog.contains(item_id) {
        return Err(ApiError::NotFound(format!(
            "Catalog item {item_id} not found"
        )));
    }
    state.projection_processor.run_catch_up().await?;

    let label = state
        .button_feedback
        .label(session_id, item_id, Utc::now())
        .await;

    Ok(Json(ButtonResponse { item_id, label }))
}
