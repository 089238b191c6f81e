//! Types shared by the event store, the domain and the API.

mod types;

pub use types::AggregateId;
