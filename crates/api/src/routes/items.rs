//! Item read endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use common::AggregateId;
use event_store::EventStore;
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub id: String,
    pub state: String,
    pub version: i64,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub event_id: String,
    pub event_type: String,
    pub version: i64,
    pub timestamp: DateTime<Utc>,
    pub payload: serde_json::Value,
}

/// GET /items/{id}: rebuild an item from its events.
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ItemResponse>, ApiError> {
    let item_id = parse_item_id(&id)?;

    let item = state
        .item_service
        .get_item(item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Item {id} not found")))?;

    Ok(Json(ItemResponse {
        id: item_id.to_string(),
        state: item.state().to_string(),
        version: item.version().as_i64(),
    }))
}

/// GET /items/{id}/events: list an item's stored events, oldest first.
#[tracing::instrument(skip(state))]
pub async fn events<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let item_id = parse_item_id(&id)?;

    let envelopes = state
        .event_store
        .get_events_for_aggregate(item_id)
        .await
        .map_err(domain::DomainError::from)?;

    if envelopes.is_empty() {
        return Err(ApiError::NotFound(format!("Item {id} not found")));
    }

    let events = envelopes
        .into_iter()
        .map(|e| EventResponse {
            event_id: e.event_id.to_string(),
            event_type: e.event_type,
            version: e.version.as_i64(),
            timestamp: e.timestamp,
            payload: e.payload,
        })
        .collect();

    Ok(Json(events))
}

fn parse_item_id(id: &str) -> Result<AggregateId, ApiError> {
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid item id {id}: {e}")))
}
