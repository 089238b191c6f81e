//! Domain error types.

use common::AggregateId;
use event_store::EventStoreError;
use thiserror::Error;

use crate::item::ItemError;

/// Errors that can occur while handling a command.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the event store.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// The item refused the requested transition.
    #[error("Item error: {0}")]
    Item(#[from] ItemError),

    /// The log holds an event type this build cannot project.
    ///
    /// The stored history and the projection code have drifted apart; the
    /// stream cannot be loaded until they agree again.
    #[error("Unhandled event {event_type} in {aggregate_type} stream {aggregate_id}")]
    UnhandledEvent {
        aggregate_type: &'static str,
        aggregate_id: AggregateId,
        event_type: String,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
