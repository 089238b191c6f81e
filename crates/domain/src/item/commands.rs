//! Item commands.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::command::Command;

use super::{Item, Money};

/// Command to order an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// The item to order.
    pub item_id: AggregateId,

    pub price: Money,

    /// When the order was placed.
    pub when: DateTime<Utc>,
}

impl Order {
    /// Creates a new Order command.
    pub fn new(item_id: AggregateId, price: Money, when: DateTime<Utc>) -> Self {
        Self {
            item_id,
            price,
            when,
        }
    }
}

impl Command for Order {
    type Aggregate = Item;

    fn aggregate_id(&self) -> AggregateId {
        self.item_id
    }
}

/// Command to pay for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pay {
    pub item_id: AggregateId,

    pub when: DateTime<Utc>,
}

impl Pay {
    /// Creates a new Pay command.
    pub fn new(item_id: AggregateId, when: DateTime<Utc>) -> Self {
        Self { item_id, when }
    }
}

impl Command for Pay {
    type Aggregate = Item;

    fn aggregate_id(&self) -> AggregateId {
        self.item_id
    }
}

/// Command to record that an item's payment deadline passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkPaymentTimeout {
    pub item_id: AggregateId,

    pub when: DateTime<Utc>,
}

impl MarkPaymentTimeout {
    /// Creates a new MarkPaymentTimeout command.
    pub fn new(item_id: AggregateId, when: DateTime<Utc>) -> Self {
        Self { item_id, when }
    }
}

impl Command for MarkPaymentTimeout {
    type Aggregate = Item;

    fn aggregate_id(&self) -> AggregateId {
        self.item_id
    }
}

/// Any command the item service accepts, tagged by name on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ItemCommand {
    Order(Order),
    Pay(Pay),
    MarkPaymentTimeout(MarkPaymentTimeout),
}

impl ItemCommand {
    /// Returns the command name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            ItemCommand::Order(_) => "Order",
            ItemCommand::Pay(_) => "Pay",
            ItemCommand::MarkPaymentTimeout(_) => "MarkPaymentTimeout",
        }
    }
}

impl Command for ItemCommand {
    type Aggregate = Item;

    fn aggregate_id(&self) -> AggregateId {
        match self {
            ItemCommand::Order(cmd) => cmd.aggregate_id(),
            ItemCommand::Pay(cmd) => cmd.aggregate_id(),
            ItemCommand::MarkPaymentTimeout(cmd) => cmd.aggregate_id(),
        }
    }
}

impl From<Order> for ItemCommand {
    fn from(cmd: Order) -> Self {
        ItemCommand::Order(cmd)
    }
}

impl From<Pay> for ItemCommand {
    fn from(cmd: Pay) -> Self {
        ItemCommand::Pay(cmd)
    }
}

impl From<MarkPaymentTimeout> for ItemCommand {
    fn from(cmd: MarkPaymentTimeout) -> Self {
        ItemCommand::MarkPaymentTimeout(cmd)
    }
}
