//! Shop item aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod service;
mod state;
mod value_objects;

pub use aggregate::Item;
pub use commands::{ItemCommand, MarkPaymentTimeout, Order, Pay};
pub use events::{ItemEvent, ItemOrderedData, ItemPaidData, ItemPaymentTimedOutData};
pub use service::ItemService;
pub use state::ItemState;
pub use value_objects::Money;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during item operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    /// The item is not in a state that allows the action.
    #[error("Invalid state transition: cannot {action} from {current_state} state")]
    InvalidTransition {
        current_state: ItemState,
        action: &'static str,
    },

    /// The payment deadline would not lie after the order time.
    #[error("Invalid payment timeout: {minutes} minutes after {ordered_at}")]
    InvalidTimeout {
        ordered_at: DateTime<Utc>,
        minutes: i64,
    },
}
