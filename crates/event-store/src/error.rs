use thiserror::Error;

use crate::{AggregateId, Version};

/// Errors raised by the event log.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// The stream moved past the version the writer loaded.
    #[error("Stream {aggregate_id} is at version {actual}, writer expected {expected}")]
    ConcurrencyConflict {
        aggregate_id: AggregateId,
        expected: Version,
        actual: Version,
    },

    /// `append` was called with no events.
    #[error("Nothing to append")]
    EmptyAppend,

    /// One batch touched more than one stream.
    #[error("Batch for stream {expected} also holds events for {found}")]
    MixedStreams {
        expected: AggregateId,
        found: AggregateId,
    },

    /// Versions inside one batch are not consecutive.
    #[error("Batch versions not consecutive: expected {expected}, got {found}")]
    VersionGap { expected: Version, found: Version },

    /// An envelope was built without one of its required fields.
    #[error("Event envelope is missing {0}")]
    IncompleteEnvelope(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Payload (de)serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for event store operations.
pub type Result<T> = std::result::Result<T, EventStoreError>;
