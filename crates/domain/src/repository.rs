//! Loads aggregates from the event log and appends their pending events.

use std::marker::PhantomData;

use common::AggregateId;
use event_store::{AppendOptions, EventEnvelope, EventStore, Version};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;

/// Event-sourced repository for one aggregate type.
///
/// The repository owns no state of its own: every `load` replays the full
/// stream, and every `append` writes the aggregate's pending events with an
/// optimistic check against the version it was loaded at.
pub struct Repository<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    store: S,
    _phantom: PhantomData<A>,
}

impl<S, A> Repository<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    /// Creates a new repository over the given event store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    /// Returns a reference to the underlying event store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads and decodes a stream's history, oldest first.
    ///
    /// Fails with [`DomainError::UnhandledEvent`] if the stream holds an
    /// event type the aggregate's event enum does not know, or an envelope
    /// whose type does not match the payload it carries.
    pub async fn load_history(&self, id: AggregateId) -> Result<Vec<A::Event>, DomainError> {
        let envelopes = self.store.get_events_for_aggregate(id).await?;

        let mut history = Vec::with_capacity(envelopes.len());
        for envelope in envelopes {
            if !A::Event::is_known(&envelope.event_type) {
                tracing::error!(
                    aggregate_id = %id,
                    event_type = %envelope.event_type,
                    version = %envelope.version,
                    "stored event has no projection"
                );
                return Err(DomainError::UnhandledEvent {
                    aggregate_type: A::aggregate_type(),
                    aggregate_id: id,
                    event_type: envelope.event_type,
                });
            }
            let event: A::Event = serde_json::from_value(envelope.payload)?;
            if event.event_type() != envelope.event_type {
                tracing::error!(
                    aggregate_id = %id,
                    event_type = %envelope.event_type,
                    payload_type = event.event_type(),
                    version = %envelope.version,
                    "stored event type disagrees with its payload"
                );
                return Err(DomainError::UnhandledEvent {
                    aggregate_type: A::aggregate_type(),
                    aggregate_id: id,
                    event_type: envelope.event_type,
                });
            }
            history.push(event);
        }

        Ok(history)
    }

    /// Rebuilds the aggregate from its full history.
    ///
    /// Unknown ids yield the aggregate's initial value.
    pub async fn load(&self, id: AggregateId) -> Result<A, DomainError> {
        let history = self.load_history(id).await?;
        Ok(A::reconstitute(id, history))
    }

    /// Appends the aggregate's pending events to stream `id`.
    ///
    /// Returns the stream version after the append. An aggregate with no
    /// pending events writes nothing. The caller commits the aggregate once
    /// this returns `Ok`.
    pub async fn append(&self, id: AggregateId, aggregate: &A) -> Result<Version, DomainError> {
        let pending = aggregate.pending_events();
        let current_version = aggregate.version();

        if pending.is_empty() {
            return Ok(current_version);
        }

        let envelopes = Self::build_envelopes(id, current_version, pending)?;
        let new_version = self
            .store
            .append(envelopes, AppendOptions::expect_version(current_version))
            .await?;

        Ok(new_version)
    }

    fn build_envelopes(
        id: AggregateId,
        current_version: Version,
        events: &[A::Event],
    ) -> Result<Vec<EventEnvelope>, DomainError> {
        let mut envelopes = Vec::with_capacity(events.len());
        let mut version = current_version;

        for event in events {
            version = version.next();
            let envelope = EventEnvelope::builder()
                .aggregate_id(id)
                .aggregate_type(A::aggregate_type())
                .event_type(event.event_type())
                .version(version)
                .payload(event)?
                .build()?;
            envelopes.push(envelope);
        }

        Ok(envelopes)
    }
}
