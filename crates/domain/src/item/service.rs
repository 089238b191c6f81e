//! Item service: the command handler for shop items.

use chrono::{DateTime, Utc};
use common::AggregateId;
use event_store::{EventStore, Version};

use crate::aggregate::Aggregate;
use crate::command::CommandResult;
use crate::error::DomainError;
use crate::repository::Repository;

use super::{Item, ItemCommand, ItemEvent, MarkPaymentTimeout, Money, Order, Pay};

/// Service handling item commands.
///
/// Every command loads the item from its full history, runs the transition,
/// appends whatever it produced in a single batch, and hands back the
/// committed item. A refused command or a no-op writes nothing.
pub struct ItemService<S: EventStore> {
    repository: Repository<S, Item>,
    minutes_to_payment_timeout: i64,
}

impl<S: EventStore> ItemService<S> {
    /// Creates a new item service over the given event store.
    pub fn new(store: S, minutes_to_payment_timeout: i64) -> Self {
        Self {
            repository: Repository::new(store),
            minutes_to_payment_timeout,
        }
    }

    /// Returns a reference to the underlying event store.
    pub fn store(&self) -> &S {
        self.repository.store()
    }

    /// Dispatches any item command to its handler.
    pub async fn handle(&self, cmd: ItemCommand) -> Result<CommandResult<Item>, DomainError> {
        match cmd {
            ItemCommand::Order(cmd) => self.order(cmd).await,
            ItemCommand::Pay(cmd) => self.pay(cmd).await,
            ItemCommand::MarkPaymentTimeout(cmd) => self.mark_payment_timeout(cmd).await,
        }
    }

    /// Orders an item.
    #[tracing::instrument(skip(self))]
    pub async fn order(&self, cmd: Order) -> Result<CommandResult<Item>, DomainError> {
        let Order {
            item_id,
            price,
            when,
        } = cmd;
        let minutes = self.minutes_to_payment_timeout;

        let result = self
            .with_item(item_id, |item| item.order(item_id, when, minutes, price))
            .await?;

        if !result.is_noop() {
            tracing::info!(%item_id, %when, %price, "item ordered");
        }
        Ok(result)
    }

    /// Pays for an item.
    #[tracing::instrument(skip(self))]
    pub async fn pay(&self, cmd: Pay) -> Result<CommandResult<Item>, DomainError> {
        let Pay { item_id, when } = cmd;

        let result = self.with_item(item_id, |item| item.pay(when)).await?;

        if !result.is_noop() {
            tracing::info!(%item_id, %when, "item paid");
        }
        Ok(result)
    }

    /// Records that an item's payment deadline passed.
    #[tracing::instrument(skip(self))]
    pub async fn mark_payment_timeout(
        &self,
        cmd: MarkPaymentTimeout,
    ) -> Result<CommandResult<Item>, DomainError> {
        let MarkPaymentTimeout { item_id, when } = cmd;

        let result = self
            .with_item(item_id, |item| item.mark_payment_timeout(when))
            .await?;

        if !result.is_noop() {
            tracing::info!(%item_id, %when, "item marked as payment timeout");
        }
        Ok(result)
    }

    /// Loads an item by ID.
    ///
    /// Returns None if the item has no events.
    #[tracing::instrument(skip(self))]
    pub async fn get_item(&self, item_id: AggregateId) -> Result<Option<Item>, DomainError> {
        let item = self.repository.load(item_id).await?;
        if item.version() == Version::initial() {
            Ok(None)
        } else {
            Ok(Some(item))
        }
    }

    /// Returns an item's committed events, oldest first.
    pub async fn get_item_events(&self, item_id: AggregateId) -> Result<Vec<ItemEvent>, DomainError> {
        self.repository.load_history(item_id).await
    }

    // Convenience methods

    /// Orders an item at the current time.
    pub async fn order_now(
        &self,
        item_id: AggregateId,
        price: Money,
    ) -> Result<CommandResult<Item>, DomainError> {
        self.order(Order::new(item_id, price, Utc::now())).await
    }

    /// Pays for an item at `when`.
    pub async fn pay_at(
        &self,
        item_id: AggregateId,
        when: DateTime<Utc>,
    ) -> Result<CommandResult<Item>, DomainError> {
        self.pay(Pay::new(item_id, when)).await
    }

    async fn with_item<F>(
        &self,
        item_id: AggregateId,
        action: F,
    ) -> Result<CommandResult<Item>, DomainError>
    where
        F: FnOnce(Item) -> Result<Item, <Item as Aggregate>::Error>,
    {
        let item = self.repository.load(item_id).await?;
        let item = action(item)?;

        let new_version = self.repository.append(item_id, &item).await?;
        let events = item.pending_events().to_vec();
        record_events(&events);

        Ok(CommandResult {
            aggregate: item.commit(),
            events,
            new_version,
        })
    }
}

fn record_events(events: &[ItemEvent]) {
    for event in events {
        match event {
            ItemEvent::ItemOrdered(_) => metrics::counter!("items_ordered_total").increment(1),
            ItemEvent::ItemPaid(_) => metrics::counter!("items_paid_total").increment(1),
            ItemEvent::ItemPaymentTimedOut(_) => {
                metrics::counter!("items_payment_timed_out_total").increment(1)
            }
        }
    }
}
