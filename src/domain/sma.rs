//! Simple Moving Average over closing prices.
//!
//! SMA(n)[i] = sum(P[i-j] for j in 0..n) / n, kept as a running sum.
//! Warmup: first (n-1) entries are `None`.

use rust_decimal::Decimal;

use crate::domain::decimal::{checked, quantize};
use crate::domain::error::StrategyLabError;

pub fn calculate_sma(prices: &[Decimal], window: usize) -> Result<Vec<Option<Decimal>>, StrategyLabError> {
    if window == 0 {
        return Err(StrategyLabError::validation("SMA window must be positive"));
    }
    if prices.len() < window {
        return Err(StrategyLabError::computation(format!(
            "need at least {window} prices for SMA({window}), got {}",
            prices.len()
        )));
    }

    let divisor = Decimal::from(window);
    let mut values = Vec::with_capacity(prices.len());
    let mut sum = Decimal::ZERO;

    for (i, &price) in prices.iter().enumerate() {
        sum = checked(sum.checked_add(price), "SMA running sum")?;
        if i >= window {
            sum = checked(sum.checked_sub(prices[i - window]), "SMA running sum")?;
        }
        if i + 1 < window {
            values.push(None);
        } else {
            values.push(Some(quantize(checked(sum.checked_div(divisor), "SMA")?)));
        }
    }

    Ok(values)
}
