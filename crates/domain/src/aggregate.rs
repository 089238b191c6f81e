//! Core aggregate and domain event traits.

use common::AggregateId;
use event_store::Version;
use serde::{Serialize, de::DeserializeOwned};

/// Trait for domain events.
///
/// Domain events are facts that already happened. They are immutable and
/// named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Every name `event_type` can return.
    ///
    /// Stored envelopes whose type is missing from this list cannot be
    /// projected and fail to load.
    const EVENT_TYPES: &'static [&'static str];

    /// Returns the event type name stored alongside the payload.
    fn event_type(&self) -> &'static str;

    /// Returns true if this build knows how to project `event_type`.
    fn is_known(event_type: &str) -> bool {
        Self::EVENT_TYPES.contains(&event_type)
    }
}

/// Trait for aggregates in an event-sourced system.
///
/// An aggregate is a value: its state is the fold of its event history,
/// and every transition returns a new value carrying the events it
/// produced until they are committed.
pub trait Aggregate: Send + Sync + Sized {
    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// The type of errors this aggregate's transitions can produce.
    type Error: std::error::Error + Send + Sync;

    /// Returns the aggregate type name recorded on stored events.
    fn aggregate_type() -> &'static str;

    /// Rebuilds an aggregate by folding `history` in order.
    ///
    /// The events are treated as committed: no invariants are checked and
    /// none of them end up pending.
    fn reconstitute(id: AggregateId, history: Vec<Self::Event>) -> Self;

    /// Returns the aggregate's identifier, if one is bound.
    fn id(&self) -> Option<AggregateId>;

    /// Number of committed events folded into this value.
    fn version(&self) -> Version;

    /// Events produced since the last reconstitute or commit, oldest first.
    fn pending_events(&self) -> &[Self::Event];

    /// Returns the same aggregate with no pending events.
    fn commit(self) -> Self;
}
