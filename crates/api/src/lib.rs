//! HTTP API server for the shop item service.
//!
//! Accepts item commands, serves items and their event history, and runs
//! the periodic order-and-pay trigger, with structured logging (tracing)
//! and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod scheduler;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::ItemService;
use event_store::EventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<S: EventStore> {
    pub item_service: Arc<ItemService<S>>,
    pub event_store: S,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EventStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::system::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/commands", post(routes::commands::submit::<S>))
        .route("/items/{id}", get(routes::items::get::<S>))
        .route("/items/{id}/events", get(routes::items::events::<S>))
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

/// Creates the application state over an event store.
pub fn create_state<S: EventStore + Clone + 'static>(
    event_store: S,
    minutes_to_payment_timeout: i64,
) -> Arc<AppState<S>> {
    let item_service = Arc::new(ItemService::new(
        event_store.clone(),
        minutes_to_payment_timeout,
    ));

    Arc::new(AppState {
        item_service,
        event_store,
    })
}
