//! Value objects for the item domain.

use serde::{Deserialize, Serialize};

/// Money amount held in integer cents.
///
/// Serializes as the bare number of cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from whole currency units.
    ///
    /// Amounts beyond the `i64` cent range clamp to its bounds; use
    /// [`Money::checked_from_dollars`] to detect that.
    pub const fn from_dollars(dollars: i64) -> Self {
        Self {
            cents: dollars.saturating_mul(100),
        }
    }

    /// Creates a Money amount from whole currency units, or `None` if the
    /// amount does not fit in `i64` cents.
    pub const fn checked_from_dollars(dollars: i64) -> Option<Self> {
        match dollars.checked_mul(100) {
            Some(cents) => Some(Self { cents }),
            None => None,
        }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the whole-unit part.
    pub fn dollars(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents part (remainder after dollars), always positive.
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}
