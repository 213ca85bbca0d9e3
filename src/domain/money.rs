//! Money helpers. Values are `Decimal` in the domain and whole minor units (cents) in storage.

use crate::errors::{Error, Result};
use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a value to two decimal places, halves away from zero.
#[must_use]
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Value of one quota when `total` is split into `count` equal shares.
///
/// Returns `None` when `count` is zero.
#[must_use]
pub fn quota_value(total: Decimal, count: u32) -> Option<Decimal> {
    if count == 0 {
        return None;
    }
    total
        .checked_div(Decimal::from(count))
        .map(round_cents)
}

/// Converts a value to minor units, rounding to cents first.
pub fn to_cents(value: Decimal) -> Result<i64> {
    let mut rounded = round_cents(value);
    rounded.rescale(2);
    i64::try_from(rounded.mantissa()).map_err(|_| Error::InvalidTotalValue { value })
}

/// Converts minor units back to a two-decimal value.
#[must_use]
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
