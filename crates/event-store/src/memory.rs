use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    AggregateId, EventEnvelope, EventStoreError, Result, Version,
    store::{AppendOptions, EventStore, validate_events_for_append},
};

/// Event store keeping every stream in process memory.
///
/// Clones share the same streams, so one store can be handed to several
/// services. Used by tests and by the service when no database is configured.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    streams: Arc<RwLock<HashMap<AggregateId, Vec<EventEnvelope>>>>,
}

impl InMemoryEventStore {
    /// Creates a new empty in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events stored across all streams.
    pub async fn event_count(&self) -> usize {
        self.streams.read().await.values().map(Vec::len).sum()
    }

    /// Writes envelopes straight into a stream, skipping every check.
    ///
    /// Lets tests plant histories that the normal append path would refuse.
    pub async fn insert_unchecked(&self, events: Vec<EventEnvelope>) {
        let mut streams = self.streams.write().await;
        for event in events {
            streams.entry(event.aggregate_id).or_default().push(event);
        }
    }
}

fn stream_version(stream: Option<&Vec<EventEnvelope>>) -> Version {
    stream
        .and_then(|events| events.last())
        .map(|e| e.version)
        .unwrap_or(Version::initial())
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, events: Vec<EventEnvelope>, options: AppendOptions) -> Result<Version> {
        validate_events_for_append(&events)?;

        let aggregate_id = events[0].aggregate_id;
        let first_new_version = events[0].version;

        let mut streams = self.streams.write().await;
        let current_version = stream_version(streams.get(&aggregate_id));

        if let Some(expected) = options.expected_version
            && current_version != expected
        {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual: current_version,
            });
        }

        // Same effect as the unique (aggregate_id, version) constraint in Postgres.
        if first_new_version != current_version.next() {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected: options.expected_version.unwrap_or(current_version),
                actual: current_version,
            });
        }

        let count = events.len();
        let last_version = current_version.advance(count);
        streams.entry(aggregate_id).or_default().extend(events);

        metrics::counter!("event_store_events_appended_total").increment(count as u64);
        tracing::debug!(%aggregate_id, %last_version, count, "events appended");

        Ok(last_version)
    }

    async fn get_events_for_aggregate(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<Vec<EventEnvelope>> {
        let streams = self.streams.read().await;
        Ok(streams.get(&aggregate_id).cloned().unwrap_or_default())
    }

    async fn get_aggregate_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>> {
        let streams = self.streams.read().await;
        Ok(streams
            .get(&aggregate_id)
            .and_then(|events| events.last())
            .map(|e| e.version))
    }
}
