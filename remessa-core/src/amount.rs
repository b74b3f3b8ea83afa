//! Monetary rendering
//!
//! Amounts are written as integer cents without separators. A negative
//! amount reaching the encoder renders as the sentinel `"000"` so that one
//! bad row never aborts the whole file.

use rust_decimal::{Decimal, RoundingStrategy};

/// Sentinel written for amounts that cannot be represented
pub const AMOUNT_SENTINEL: &str = "000";

/// Integer cents of a non-negative amount, `None` when negative
pub fn to_cents(amount: Decimal) -> Option<u128> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return None;
    }
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    u128::try_from(rounded.mantissa()).ok()
}

/// Render an amount as cents, e.g. `100.00` -> `"10000"`, `0.5` -> `"050"`
pub fn render_cents(amount: Decimal) -> String {
    match to_cents(amount) {
        Some(cents) => format!("{:03}", cents),
        None => AMOUNT_SENTINEL.to_string(),
    }
}

/// Render a cents total, e.g. `15000` -> `"15000"`
pub fn render_total(cents: u128) -> String {
    format!("{:03}", cents)
}

/// Cents back to a decimal amount, saturating at `Decimal::MAX`
pub fn from_cents(cents: u128) -> Decimal {
    let cents = i128::try_from(cents).unwrap_or(i128::MAX);
    Decimal::try_from_i128_with_scale(cents, 2).unwrap_or(Decimal::MAX)
}
