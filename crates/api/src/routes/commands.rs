//! Command submission endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use domain::{Command, ItemCommand, ItemEvent};
use event_store::EventStore;
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub item_id: String,
    pub command: &'static str,
    pub state: String,
    pub version: i64,
    /// Events the command appended. Empty when it changed nothing.
    pub events: Vec<ItemEvent>,
}

/// POST /commands: dispatch an item command to the handler.
#[tracing::instrument(skip(state))]
pub async fn submit<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(cmd): Json<ItemCommand>,
) -> Result<(StatusCode, Json<CommandResponse>), ApiError> {
    let item_id = cmd.aggregate_id();
    let command = cmd.name();

    let result = state.item_service.handle(cmd).await?;

    let response = CommandResponse {
        item_id: item_id.to_string(),
        command,
        state: result.aggregate.state().to_string(),
        version: result.new_version.as_i64(),
        events: result.events,
    };
    Ok((StatusCode::ACCEPTED, Json(response)))
}
