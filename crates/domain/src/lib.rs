//! Domain layer for the shop item service.
//!
//! This crate provides:
//! - the `Aggregate` and `DomainEvent` traits for event-sourced entities
//! - a `Repository` that rebuilds aggregates from the event log and appends
//!   their pending events
//! - the shop item aggregate, its events and commands, and `ItemService`,
//!   the command handler that ties them together

pub mod aggregate;
pub mod command;
pub mod error;
pub mod item;
pub mod repository;

pub use aggregate::{Aggregate, DomainEvent};
pub use command::{Command, CommandResult};
pub use error::DomainError;
pub use item::{
    Item, ItemCommand, ItemError, ItemEvent, ItemOrderedData, ItemPaidData,
    ItemPaymentTimedOutData, ItemService, ItemState, MarkPaymentTimeout, Money, Order, Pay,
};
pub use repository::Repository;
