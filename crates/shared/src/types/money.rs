//! Bounds for stored money amounts.
//!
//! Every amount column is `NUMERIC(19, 4)`: four decimal places and at most
//! fifteen integer digits. Anything outside that would be rounded or
//! rejected by the database, so callers check here first.

use rust_decimal::Decimal;

/// Decimal places a stored amount may carry.
pub const MONEY_SCALE: u32 = 4;

/// Exclusive upper bound on the magnitude of a stored amount.
pub const MONEY_LIMIT: i64 = 1_000_000_000_000_000;

/// Returns true if `amount` is stored exactly by a money column.
///
/// Trailing zeros do not count against the scale, so `10.50000` fits.
#[must_use]
pub fn fits_money_column(amount: Decimal) -> bool {
    amount.normalize().scale() <= MONEY_SCALE && amount.abs() < Decimal::from(MONEY_LIMIT)
}
