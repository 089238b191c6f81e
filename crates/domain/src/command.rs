//! Command primitives.

use common::AggregateId;
use event_store::Version;

use crate::aggregate::Aggregate;

/// Trait for commands that target one aggregate.
///
/// Commands express an intent. The aggregate decides whether it turns into
/// events, nothing, or an error.
pub trait Command: Send + Sync {
    /// The type of aggregate this command targets.
    type Aggregate: Aggregate;

    /// Returns the ID of the aggregate this command targets.
    fn aggregate_id(&self) -> AggregateId;
}

/// Outcome of a handled command.
#[derive(Debug)]
pub struct CommandResult<A: Aggregate> {
    /// The aggregate after the command, already committed.
    pub aggregate: A,

    /// The events the command appended to the log. Empty for a no-op.
    pub events: Vec<A::Event>,

    /// Stream version after the command.
    pub new_version: Version,
}

impl<A: Aggregate> CommandResult<A> {
    /// Returns true if the command changed nothing.
    pub fn is_noop(&self) -> bool {
        self.events.is_empty()
    }
}
