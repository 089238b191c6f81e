use async_trait::async_trait;

use crate::{AggregateId, EventEnvelope, EventStoreError, Result, Version};

/// Options for appending events to the store.
#[derive(Debug, Clone, Default)]
pub struct AppendOptions {
    /// Version the stream must currently be at for the append to succeed.
    /// `None` skips the check; the batch must still continue the stream.
    pub expected_version: Option<Version>,
}

impl AppendOptions {
    /// Creates options with no version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options expecting the stream to be at `version`.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// Creates options expecting the stream to be empty.
    pub fn expect_new() -> Self {
        Self::expect_version(Version::initial())
    }
}

/// Append-only, per-stream ordered event log.
///
/// Implementations must be durable before `append` returns `Ok` and must
/// hand back a stream's events in the order they were appended.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends a batch of events to one stream, atomically.
    ///
    /// Fails with `ConcurrencyConflict` when `options.expected_version` is
    /// set and does not match the stream, or when the batch does not start
    /// right after the stream's current version. Returns the new version.
    async fn append(&self, events: Vec<EventEnvelope>, options: AppendOptions) -> Result<Version>;

    /// Returns every event of a stream, oldest first. Unknown streams yield
    /// an empty list.
    async fn get_events_for_aggregate(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<Vec<EventEnvelope>>;

    /// Returns the current version of a stream, or `None` if it has no events.
    async fn get_aggregate_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>>;
}

/// Convenience methods available on every [`EventStore`].
#[async_trait]
pub trait EventStoreExt: EventStore {
    /// Checks whether a stream has any events.
    async fn aggregate_exists(&self, aggregate_id: AggregateId) -> Result<bool> {
        Ok(self.get_aggregate_version(aggregate_id).await?.is_some())
    }
}

impl<T: EventStore + ?Sized> EventStoreExt for T {}

/// Checks that a batch is non-empty, targets a single stream and carries
/// consecutive versions.
pub fn validate_events_for_append(events: &[EventEnvelope]) -> Result<()> {
    let Some((first, rest)) = events.split_first() else {
        return Err(EventStoreError::EmptyAppend);
    };

    let mut expected = first.version;
    for event in rest {
        if event.aggregate_id != first.aggregate_id {
            return Err(EventStoreError::MixedStreams {
                expected: first.aggregate_id,
                found: event.aggregate_id,
            });
        }
        expected = expected.next();
        if event.version != expected {
            return Err(EventStoreError::VersionGap {
                expected,
                found: event.version,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(aggregate_id: AggregateId, version: i64) -> EventEnvelope {
        EventEnvelope::builder()
            .aggregate_id(aggregate_id)
            .aggregate_type("ShopItem")
            .event_type("ItemPaid")
            .version(Version::new(version))
            .payload_raw(serde_json::json!({}))
            .build()
            .unwrap()
    }

    #[test]
    fn rejects_empty_batch() {
        assert!(matches!(
            validate_events_for_append(&[]),
            Err(EventStoreError::EmptyAppend)
        ));
    }

    #[test]
    fn rejects_mixed_streams() {
        let batch = vec![
            envelope(AggregateId::new(), 1),
            envelope(AggregateId::new(), 2),
        ];
        assert!(matches!(
            validate_events_for_append(&batch),
            Err(EventStoreError::MixedStreams { .. })
        ));
    }

    #[test]
    fn rejects_version_gap() {
        let id = AggregateId::new();
        let batch = vec![envelope(id, 1), envelope(id, 3)];
        assert!(matches!(
            validate_events_for_append(&batch),
            Err(EventStoreError::VersionGap { found, .. }) if found == Version::new(3)
        ));
    }

    #[test]
    fn accepts_consecutive_batch() {
        let id = AggregateId::new();
        let batch = vec![envelope(id, 4), envelope(id, 5), envelope(id, 6)];
        assert!(validate_events_for_append(&batch).is_ok());
    }
}
