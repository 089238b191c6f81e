//! Item lifecycle states.

use serde::{Deserialize, Serialize};

/// The state of a shop item in its lifecycle.
///
/// State transitions:
/// ```text
/// Initialized ──► Ordered ──────────────► Paid
///                    │                     ▲
///                    └──► PaymentMissing ──┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ItemState {
    /// Nothing has happened to the item yet.
    #[default]
    Initialized,

    /// Ordered and waiting for payment.
    Ordered,

    /// Paid. A payment timeout can no longer be recorded.
    Paid,

    /// The payment deadline passed without payment. A late payment is still accepted.
    PaymentMissing,
}

impl ItemState {
    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemState::Initialized => "Initialized",
            ItemState::Ordered => "Ordered",
            ItemState::Paid => "Paid",
            ItemState::PaymentMissing => "PaymentMissing",
        }
    }
}

impl std::fmt::Display for ItemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
