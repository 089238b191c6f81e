//! Background trigger that orders and pays for a fresh item on a fixed period.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::AggregateId;
use domain::{DomainError, ItemService, Money, Order, Pay};
use event_store::EventStore;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Price of every scheduled order.
pub const SCHEDULED_PRICE: Money = Money::from_dollars(10);

/// Periodically sends `Order` then `Pay` for a newly generated item.
///
/// A failed tick is logged and the loop carries on; only the shutdown
/// signal stops it.
pub struct Scheduler<S: EventStore> {
    service: Arc<ItemService<S>>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl<S: EventStore> Scheduler<S> {
    /// Creates a scheduler and the sender that stops it.
    ///
    /// Send `true` (or drop the sender) to stop a running scheduler.
    pub fn new(service: Arc<ItemService<S>>, interval: Duration) -> (Self, watch::Sender<bool>) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let scheduler = Self {
            service,
            interval,
            shutdown: shutdown_rx,
        };
        (scheduler, shutdown_tx)
    }

    /// Runs until shutdown is signalled. The first tick fires immediately.
    pub async fn run(self) {
        let Self {
            service,
            interval,
            mut shutdown,
        } = self;
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_ms = interval.as_millis() as u64, "scheduler started");

        while !*shutdown.borrow() {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(error) = order_and_pay(&service).await {
                        tracing::warn!(%error, "scheduled order failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::info!("scheduler stopped");
    }

    /// Orders and pays for one new item, returning its id.
    pub async fn tick(&self) -> Result<AggregateId, DomainError> {
        order_and_pay(&self.service).await
    }
}

async fn order_and_pay<S: EventStore>(service: &ItemService<S>) -> Result<AggregateId, DomainError> {
    let item_id = AggregateId::new();

    service
        .order(Order::new(item_id, SCHEDULED_PRICE, Utc::now()))
        .await?;
    service.pay(Pay::new(item_id, Utc::now())).await?;

    Ok(item_id)
}
