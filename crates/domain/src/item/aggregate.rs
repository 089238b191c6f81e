//! Shop item aggregate implementation.

use chrono::{DateTime, TimeDelta, Utc};
use common::AggregateId;
use event_store::Version;

use crate::aggregate::Aggregate;

use super::{ItemError, ItemEvent, ItemState, Money};

/// Shop item aggregate root.
///
/// An `Item` is an immutable value. Every transition consumes the current
/// value and returns the next one with the produced event appended to its
/// pending list; [`Item::commit`] clears that list once the events are in
/// the log. State is only ever changed by folding an event, so replaying
/// the committed history always lands on the same value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    /// Stream identifier; rebound by `ItemOrdered`.
    id: Option<AggregateId>,

    state: ItemState,

    /// Committed events folded into this value.
    version: Version,

    /// Events produced since the last reconstitute or commit.
    pending: Vec<ItemEvent>,
}

impl Aggregate for Item {
    type Event = ItemEvent;
    type Error = ItemError;

    fn aggregate_type() -> &'static str {
        "ShopItem"
    }

    fn reconstitute(id: AggregateId, history: Vec<ItemEvent>) -> Self {
        Item::reconstitute(id, history)
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn pending_events(&self) -> &[ItemEvent] {
        &self.pending
    }

    fn commit(self) -> Self {
        Item::commit(self)
    }
}

// Query methods
impl Item {
    /// Returns a fresh item: `Initialized`, no id, nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Option<AggregateId> {
        self.id
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Events produced since the item was last reconstituted or committed.
    pub fn pending_events(&self) -> &[ItemEvent] {
        &self.pending
    }
}

// Command methods (return the next value)
impl Item {
    /// Orders the item.
    ///
    /// Only an `Initialized` item is ordered; any later state returns the
    /// item unchanged. The payment deadline is `when` plus
    /// `minutes_to_payment_timeout` and must lie strictly after `when`.
    pub fn order(
        self,
        id: AggregateId,
        when: DateTime<Utc>,
        minutes_to_payment_timeout: i64,
        price: Money,
    ) -> Result<Self, ItemError> {
        if self.state != ItemState::Initialized {
            return Ok(self);
        }

        let payment_due_at = payment_due_date(when, minutes_to_payment_timeout)?;
        Ok(self.apply_change(ItemEvent::item_ordered(id, when, payment_due_at, price)))
    }

    /// Pays for the item.
    ///
    /// Paying a `Paid` item returns it unchanged; an `Ordered` or
    /// `PaymentMissing` item becomes `Paid`.
    pub fn pay(self, when: DateTime<Utc>) -> Result<Self, ItemError> {
        let item_id = self.ordered_id("pay")?;
        if self.state == ItemState::Paid {
            return Ok(self);
        }

        Ok(self.apply_change(ItemEvent::item_paid(item_id, when)))
    }

    /// Records that the payment deadline passed.
    ///
    /// Refused once the item is paid. An item already marked
    /// `PaymentMissing` is returned unchanged.
    pub fn mark_payment_timeout(self, when: DateTime<Utc>) -> Result<Self, ItemError> {
        let item_id = self.ordered_id("mark payment timeout")?;
        match self.state {
            ItemState::Paid => Err(ItemError::InvalidTransition {
                current_state: self.state,
                action: "mark payment timeout",
            }),
            ItemState::Ordered => {
                Ok(self.apply_change(ItemEvent::item_payment_timed_out(item_id, when)))
            }
            ItemState::Initialized | ItemState::PaymentMissing => Ok(self),
        }
    }

    /// Rebuilds an item from committed history.
    pub fn reconstitute(id: AggregateId, history: impl IntoIterator<Item = ItemEvent>) -> Self {
        let seed = Item {
            id: Some(id),
            ..Item::default()
        };

        history.into_iter().fold(seed, |item, event| {
            let item = item.apply(&event);
            Item {
                version: item.version.next(),
                ..item
            }
        })
    }

    /// Marks the pending events as written to the log.
    pub fn commit(self) -> Self {
        Item {
            version: self.version.advance(self.pending.len()),
            pending: Vec::new(),
            ..self
        }
    }

    /// Returns the bound id, or refuses `action` on an item never ordered.
    fn ordered_id(&self, action: &'static str) -> Result<AggregateId, ItemError> {
        match (self.state, self.id) {
            (ItemState::Initialized, _) | (_, None) => Err(ItemError::InvalidTransition {
                current_state: self.state,
                action,
            }),
            (_, Some(id)) => Ok(id),
        }
    }
}

// Apply event helpers
impl Item {
    fn apply_change(self, event: ItemEvent) -> Self {
        let mut item = self.apply(&event);
        item.pending.push(event);
        item
    }

    fn apply(self, event: &ItemEvent) -> Self {
        match event {
            ItemEvent::ItemOrdered(data) => Item {
                id: Some(data.item_id),
                state: ItemState::Ordered,
                ..self
            },
            ItemEvent::ItemPaid(_) => Item {
                state: ItemState::Paid,
                ..self
            },
            ItemEvent::ItemPaymentTimedOut(_) => Item {
                state: ItemState::PaymentMissing,
                ..self
            },
        }
    }
}

fn payment_due_date(
    ordered_at: DateTime<Utc>,
    minutes_to_payment_timeout: i64,
) -> Result<DateTime<Utc>, ItemError> {
    TimeDelta::try_minutes(minutes_to_payment_timeout)
        .and_then(|timeout| ordered_at.checked_add_signed(timeout))
        .filter(|due| *due > ordered_at)
        .ok_or(ItemError::InvalidTimeout {
            ordered_at,
            minutes: minutes_to_payment_timeout,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const MINUTES_TO_PAYMENT_TIMEOUT: i64 = 48;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn later(minutes: i64) -> DateTime<Utc> {
        t0() + TimeDelta::minutes(minutes)
    }

    fn price() -> Money {
        Money::from_dollars(10)
    }

    fn ordered(id: AggregateId) -> Item {
        Item::new()
            .order(id, t0(), MINUTES_TO_PAYMENT_TIMEOUT, price())
            .unwrap()
            .commit()
    }

    fn paid(id: AggregateId) -> Item {
        ordered(id).pay(later(1)).unwrap().commit()
    }

    fn with_timeout(id: AggregateId) -> Item {
        ordered(id)
            .mark_payment_timeout(later(49))
            .unwrap()
            .commit()
    }

    #[test]
    fn test_new_item_is_initialized() {
        let item = Item::new();
        assert_eq!(item.state(), ItemState::Initialized);
        assert_eq!(item.id(), None);
        assert!(item.pending_events().is_empty());
    }

    #[test]
    fn test_order_binds_id_and_sets_payment_deadline() {
        let id = AggregateId::new();

        let item = Item::new()
            .order(id, t0(), MINUTES_TO_PAYMENT_TIMEOUT, price())
            .unwrap();

        assert_eq!(item.state(), ItemState::Ordered);
        assert_eq!(item.id(), Some(id));
        assert_eq!(
            item.pending_events(),
            [ItemEvent::item_ordered(id, t0(), later(48), price())]
        );
    }

    #[test]
    fn test_order_then_pay_before_commit() {
        let id = AggregateId::new();

        let item = Item::new()
            .order(id, t0(), MINUTES_TO_PAYMENT_TIMEOUT, price())
            .unwrap()
            .pay(later(5))
            .unwrap();

        assert_eq!(item.state(), ItemState::Paid);
        assert_eq!(
            item.pending_events(),
            [
                ItemEvent::item_ordered(id, t0(), later(48), price()),
                ItemEvent::item_paid(id, later(5)),
            ]
        );
    }

    #[test]
    fn test_ordering_twice_is_noop() {
        let id = AggregateId::new();
        let item = ordered(id);

        let again = item.clone().order(id, later(10), 5, price()).unwrap();

        assert_eq!(again, item);
        assert!(again.pending_events().is_empty());
    }

    #[test]
    fn test_ordering_after_payment_or_timeout_is_noop() {
        let id = AggregateId::new();

        for item in [paid(id), with_timeout(id)] {
            let again = item.clone().order(AggregateId::new(), later(60), 5, price()).unwrap();
            assert_eq!(again, item);
        }
    }

    #[test]
    fn test_order_rejects_deadline_not_after_order_time() {
        for minutes in [0, -1, -60] {
            let result = Item::new().order(AggregateId::new(), t0(), minutes, price());
            assert!(matches!(
                result,
                Err(ItemError::InvalidTimeout { minutes: m, .. }) if m == minutes
            ));
        }
    }

    #[test]
    fn test_order_rejects_overflowing_deadline() {
        let result = Item::new().order(AggregateId::new(), t0(), i64::MAX, price());
        assert!(matches!(result, Err(ItemError::InvalidTimeout { .. })));

        let result = Item::new().order(AggregateId::new(), DateTime::<Utc>::MAX_UTC, 1, price());
        assert!(matches!(result, Err(ItemError::InvalidTimeout { .. })));
    }

    #[test]
    fn test_pay_initialized_item_fails() {
        let result = Item::new().pay(t0());
        assert!(matches!(
            result,
            Err(ItemError::InvalidTransition {
                current_state: ItemState::Initialized,
                ..
            })
        ));

        let result = Item::reconstitute(AggregateId::new(), vec![]).pay(t0());
        assert!(matches!(result, Err(ItemError::InvalidTransition { .. })));
    }

    #[test]
    fn test_paying_twice_is_noop() {
        let item = paid(AggregateId::new());

        let again = item.clone().pay(later(2)).unwrap();

        assert_eq!(again, item);
        assert!(again.pending_events().is_empty());
    }

    #[test]
    fn test_pay_after_timeout_is_accepted() {
        let id = AggregateId::new();

        let item = with_timeout(id).pay(later(50)).unwrap();

        assert_eq!(item.state(), ItemState::Paid);
        assert_eq!(item.pending_events(), [ItemEvent::item_paid(id, later(50))]);
    }

    #[test]
    fn test_mark_timeout_on_ordered_item() {
        let id = AggregateId::new();

        let item = ordered(id).mark_payment_timeout(later(49)).unwrap();

        assert_eq!(item.state(), ItemState::PaymentMissing);
        assert_eq!(
            item.pending_events(),
            [ItemEvent::item_payment_timed_out(id, later(49))]
        );
    }

    #[test]
    fn test_mark_timeout_twice_emits_one_event() {
        let item = ordered(AggregateId::new())
            .mark_payment_timeout(later(49))
            .unwrap()
            .mark_payment_timeout(later(50))
            .unwrap();

        assert_eq!(item.state(), ItemState::PaymentMissing);
        assert_eq!(item.pending_events().len(), 1);
    }

    #[test]
    fn test_mark_timeout_on_initialized_item_fails() {
        let result = Item::new().mark_payment_timeout(t0());
        assert!(matches!(
            result,
            Err(ItemError::InvalidTransition {
                current_state: ItemState::Initialized,
                ..
            })
        ));
    }

    #[test]
    fn test_mark_timeout_on_paid_item_fails() {
        let result = paid(AggregateId::new()).mark_payment_timeout(later(60));
        assert!(matches!(
            result,
            Err(ItemError::InvalidTransition {
                current_state: ItemState::Paid,
                ..
            })
        ));
    }

    #[test]
    fn test_commit_clears_pending_and_keeps_state() {
        let item = Item::new()
            .order(AggregateId::new(), t0(), MINUTES_TO_PAYMENT_TIMEOUT, price())
            .unwrap()
            .pay(later(1))
            .unwrap();

        let committed = item.clone().commit();

        assert_eq!(committed.state(), item.state());
        assert_eq!(committed.id(), item.id());
        assert!(committed.pending_events().is_empty());
        assert_eq!(committed.version(), Version::new(2));
    }

    #[test]
    fn test_reconstitute_replays_history_without_pending() {
        let id = AggregateId::new();
        let history = vec![
            ItemEvent::item_ordered(id, t0(), later(48), price()),
            ItemEvent::item_payment_timed_out(id, later(49)),
            ItemEvent::item_paid(id, later(50)),
        ];

        let item = Item::reconstitute(id, history);

        assert_eq!(item.state(), ItemState::Paid);
        assert_eq!(item.id(), Some(id));
        assert_eq!(item.version(), Version::new(3));
        assert!(item.pending_events().is_empty());
    }

    #[test]
    fn test_reconstitute_is_deterministic() {
        let id = AggregateId::new();
        let history = vec![
            ItemEvent::item_ordered(id, t0(), later(48), price()),
            ItemEvent::item_payment_timed_out(id, later(49)),
        ];

        let first = Item::reconstitute(id, history.clone());
        let second = Item::reconstitute(id, history);

        assert_eq!(first, second);
        assert_eq!(first.state(), ItemState::PaymentMissing);
    }

    #[test]
    fn test_commit_round_trips_through_reconstitute() {
        let id = AggregateId::new();
        let item = Item::new()
            .order(id, t0(), MINUTES_TO_PAYMENT_TIMEOUT, price())
            .unwrap()
            .mark_payment_timeout(later(49))
            .unwrap()
            .pay(later(50))
            .unwrap();
        let appended = item.pending_events().to_vec();

        let rebuilt = Item::reconstitute(id, appended);

        assert_eq!(rebuilt, item.commit());
    }

    #[test]
    fn test_transitions_continue_from_reconstituted_item() {
        let id = AggregateId::new();
        let committed = ordered(id).mark_payment_timeout(later(49)).unwrap();
        let history = committed.pending_events().to_vec();
        let stored = Item::reconstitute(
            id,
            std::iter::once(ItemEvent::item_ordered(id, t0(), later(48), price())).chain(history),
        );

        let item = stored.pay(later(55)).unwrap();

        assert_eq!(item.version(), Version::new(2));
        assert_eq!(item.pending_events(), [ItemEvent::item_paid(id, later(55))]);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Step {
            Order { at: i64, minutes: i64, cents: i64 },
            Pay { at: i64 },
            MarkPaymentTimeout { at: i64 },
            Commit,
        }

        fn step() -> impl Strategy<Value = Step> {
            prop_oneof![
                (0..10_000i64, -5..120i64, 0..100_000i64)
                    .prop_map(|(at, minutes, cents)| Step::Order { at, minutes, cents }),
                (0..10_000i64).prop_map(|at| Step::Pay { at }),
                (0..10_000i64).prop_map(|at| Step::MarkPaymentTimeout { at }),
                Just(Step::Commit),
            ]
        }

        /// Runs `steps` against a fresh item, skipping refused ones.
        ///
        /// Returns the final item and every event it emitted, in order.
        fn run(id: AggregateId, steps: &[Step]) -> (Item, Vec<ItemEvent>) {
            let mut item = Item::reconstitute(id, vec![]);
            let mut emitted = Vec::new();

            for step in steps {
                let next = match step {
                    Step::Order { at, minutes, cents } => {
                        item.clone()
                            .order(id, later(*at), *minutes, Money::from_cents(*cents))
                    }
                    Step::Pay { at } => item.clone().pay(later(*at)),
                    Step::MarkPaymentTimeout { at } => {
                        item.clone().mark_payment_timeout(later(*at))
                    }
                    Step::Commit => {
                        emitted.extend_from_slice(item.pending_events());
                        Ok(item.clone().commit())
                    }
                };
                if let Ok(next) = next {
                    item = next;
                }
            }

            emitted.extend_from_slice(item.pending_events());
            (item, emitted)
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: replaying the same history twice gives the same item.
            #[test]
            fn reconstitute_is_deterministic(steps in prop::collection::vec(step(), 0..24)) {
                let id = AggregateId::new();
                let (_, history) = run(id, &steps);

                prop_assert_eq!(
                    Item::reconstitute(id, history.clone()),
                    Item::reconstitute(id, history)
                );
            }

            /// Property: replaying everything an item emitted rebuilds the committed item.
            #[test]
            fn emitted_events_rebuild_committed_item(
                steps in prop::collection::vec(step(), 0..24)
            ) {
                let id = AggregateId::new();
                let (item, history) = run(id, &steps);

                prop_assert_eq!(Item::reconstitute(id, history), item.commit());
            }

            /// Property: an item is ordered at most once and never times out after payment.
            #[test]
            fn emitted_history_respects_lifecycle(steps in prop::collection::vec(step(), 0..24)) {
                let (_, history) = run(AggregateId::new(), &steps);

                let orders = history
                    .iter()
                    .filter(|e| matches!(e, ItemEvent::ItemOrdered(_)))
                    .count();
                prop_assert!(orders <= 1);

                if let Some(paid_at) = history
                    .iter()
                    .position(|e| matches!(e, ItemEvent::ItemPaid(_)))
                {
                    prop_assert!(
                        !history[paid_at..]
                            .iter()
                            .any(|e| matches!(e, ItemEvent::ItemPaymentTimedOut(_)))
                    );
                }

                if let Some(first) = history.first() {
                    prop_assert!(matches!(first, ItemEvent::ItemOrdered(_)));
                }
            }
        }
    }
}
