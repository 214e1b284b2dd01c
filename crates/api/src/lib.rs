//! HTTP API server for the storefront.
//!
//! Provides REST endpoints for the catalog, per-session carts and the
//! navigation menu, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use chrono::TimeDelta;
use domain::{CartService, Catalog};
use event_store::EventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use projections::{
    ButtonFeedbackView, CartBadgeView, CartContentsView, DEFAULT_REVERT_MS, ProjectionProcessor,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use state::{AppState, SessionRegistry};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EventStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<S>))
        .route("/catalog", get(routes::catalog::list::<S>))
        .route("/catalog/{item_id}", get(routes::catalog::get::<S>))
        .route("/sessions", post(routes::sessions::open::<S>))
        .route("/sessions/{id}", delete(routes::sessions::close::<S>))
        .route("/sessions/{id}/events", get(routes::sessions::events::<S>))
        .route(
            "/sessions/{id}/navigation/{action}",
            post(routes::sessions::navigate::<S>),
        )
        .route("/sessions/{id}/cart", get(routes::cart::get::<S>))
        .route("/sessions/{id}/cart/count", get(routes::cart::count::<S>))
        .route("/sessions/{id}/cart/items", post(routes::cart::add_item::<S>))
        .route(
            "/sessions/{id}/cart/items/{item_id}/button",
            get(routes::cart::button::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state over `event_store` for the given catalog.
///
/// The three cart views are registered with a shared projection processor.
pub fn create_state<S: EventStore + Clone + 'static>(
    event_store: S,
    catalog: Catalog,
    feedback_revert: TimeDelta,
) -> Arc<AppState<S>> {
    let catalog = Arc::new(catalog);
    let cart_service = CartService::new(event_store.clone(), Arc::clone(&catalog));

    let cart_badge = CartBadgeView::new();
    let cart_contents = CartContentsView::new();
    let button_feedback = ButtonFeedbackView::with_revert_window(feedback_revert);

    let mut processor = ProjectionProcessor::new(event_store.clone());
    processor.register(Box::new(cart_badge.clone()));
    processor.register(Box::new(cart_contents.clone()));
    processor.register(Box::new(button_feedback.clone()));

    Arc::new(AppState {
        cart_service,
        catalog,
        sessions: SessionRegistry::new(),
        cart_badge,
        cart_contents,
        button_feedback,
        event_store,
        projection_processor: Arc::new(processor),
    })
}

/// Creates state with the built-in storefront catalog and default feedback window.
pub fn create_default_state<S: EventStore + Clone + 'static>(event_store: S) -> Arc<AppState<S>> {
    create_state(
        event_store,
        Catalog::storefront(),
        TimeDelta::milliseconds(DEFAULT_REVERT_MS),
    )
}
