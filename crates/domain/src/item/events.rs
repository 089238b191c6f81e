//! Shop item domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::Money;

/// Events that can occur on a shop item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ItemEvent {
    /// The item was ordered and a payment deadline set.
    ItemOrdered(ItemOrderedData),

    /// The item was paid.
    ItemPaid(ItemPaidData),

    /// The payment deadline passed without payment.
    ItemPaymentTimedOut(ItemPaymentTimedOutData),
}

impl DomainEvent for ItemEvent {
    const EVENT_TYPES: &'static [&'static str] =
        &["ItemOrdered", "ItemPaid", "ItemPaymentTimedOut"];

    fn event_type(&self) -> &'static str {
        match self {
            ItemEvent::ItemOrdered(_) => "ItemOrdered",
            ItemEvent::ItemPaid(_) => "ItemPaid",
            ItemEvent::ItemPaymentTimedOut(_) => "ItemPaymentTimedOut",
        }
    }
}

/// Data for ItemOrdered event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOrderedData {
    pub item_id: AggregateId,

    pub ordered_at: DateTime<Utc>,

    /// Deadline after which the payment counts as missing.
    pub payment_due_at: DateTime<Utc>,

    pub price: Money,
}

/// Data for ItemPaid event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPaidData {
    pub item_id: AggregateId,

    pub paid_at: DateTime<Utc>,
}

/// Data for ItemPaymentTimedOut event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPaymentTimedOutData {
    pub item_id: AggregateId,

    pub timed_out_at: DateTime<Utc>,
}

impl ItemEvent {
    pub fn item_ordered(
        item_id: AggregateId,
        ordered_at: DateTime<Utc>,
        payment_due_at: DateTime<Utc>,
        price: Money,
    ) -> Self {
        ItemEvent::ItemOrdered(ItemOrderedData {
            item_id,
            ordered_at,
            payment_due_at,
            price,
        })
    }

    pub fn item_paid(item_id: AggregateId, paid_at: DateTime<Utc>) -> Self {
        ItemEvent::ItemPaid(ItemPaidData { item_id, paid_at })
    }

    pub fn item_payment_timed_out(item_id: AggregateId, timed_out_at: DateTime<Utc>) -> Self {
        ItemEvent::ItemPaymentTimedOut(ItemPaymentTimedOutData {
            item_id,
            timed_out_at,
        })
    }

    /// Returns the item the event belongs to.
    pub fn item_id(&self) -> AggregateId {
        match self {
            ItemEvent::ItemOrdered(data) => data.item_id,
            ItemEvent::ItemPaid(data) => data.item_id,
            ItemEvent::ItemPaymentTimedOut(data) => data.item_id,
        }
    }
}
