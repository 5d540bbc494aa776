//! Fixed rounding rules for money and ratio values.
//!
//! Metrics and SMA values are quantized to 6 fractional digits, equity
//! values to 2, and share quantities to 16 significant digits. All rounding
//! is half-up (away from zero on a tie).

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::error::StrategyLabError;

pub const METRIC_SCALE: u32 = 6;
pub const EQUITY_SCALE: u32 = 2;
pub const QUANTITY_SIGNIFICANT_DIGITS: u32 = 16;

const HALF_UP: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// Round to [`METRIC_SCALE`] fractional digits.
pub fn quantize(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(METRIC_SCALE, HALF_UP)
}

/// Round to cents.
pub fn quantize_equity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(EQUITY_SCALE, HALF_UP)
}

/// Turns an overflowed `checked_*` result into a computation error.
pub fn checked(value: Option<Decimal>, what: &str) -> Result<Decimal, StrategyLabError> {
    value.ok_or_else(|| StrategyLabError::computation(format!("{what} overflowed")))
}

/// `amount / price`, rounded to 16 significant digits.
pub fn shares_for(amount: Decimal, price: Decimal) -> Result<Decimal, StrategyLabError> {
    if price <= Decimal::ZERO {
        return Err(StrategyLabError::computation(format!(
            "cannot buy at non-positive price {price}"
        )));
    }
    let raw = amount
        .checked_div(price)
        .ok_or_else(|| StrategyLabError::computation("share quantity overflow"))?;
    Ok(raw
        .round_sf_with_strategy(QUANTITY_SIGNIFICANT_DIGITS, HALF_UP)
        .unwrap_or(raw))
}

/// Converts a float statistic back into a quantized decimal.
///
/// Non-finite or out-of-range values collapse to zero.
pub fn from_f64_quantized(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_f64(value).map(quantize).unwrap_or(Decimal::ZERO)
}

pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}
