//! Catalog listing endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::CatalogItemId;
use domain::{CatalogItem, StarBreakdown};
use event_store::EventStore;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct CatalogItemResponse {
    pub id: CatalogItemId,
    pub name: String,
    pub price_cents: i64,
    pub price: String,
    pub image: String,
    pub rating: u8,
    pub stars: StarBreakdown,
}

impl From<&CatalogItem> for CatalogItemResponse {
    fn from(item: &CatalogItem) -> Self {
        Self {
            id: item.id(),
            name: item.name().to_string(),
            price_cents: item.unit_price().cents(),
            price: item.unit_price().to_string(),
            image: item.image().to_string(),
            rating: item.rating().value(),
            stars: item.rating().stars(),
        }
    }
}

/// GET /catalog — every item on sale, in catalog order.
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<Vec<CatalogItemResponse>> {
    Json(state.catalog.items().map(CatalogItemResponse::from).collect())
}

/// GET /catalog/{item_id} — a single item.
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(item_id): Path<u32>,
) -> Result<Json<CatalogItemResponse>, ApiError> {
    state
        .catalog
        .get(CatalogItemId::new(item_id))
        .map(|item| Json(CatalogItemResponse::from(item)))
        .ok_or_else(|| ApiError::NotFound(format!("Catalog item {item_id} not found")))
}
