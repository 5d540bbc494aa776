//! Performance metrics computed from an equity curve.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::decimal::{from_f64_quantized, quantize, to_f64};
use crate::domain::error::StrategyLabError;
use crate::domain::portfolio::EquityPoint;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const DAYS_PER_YEAR: f64 = 365.25;

/// Summary statistics for one backtest run. Decimal fields carry 6
/// fractional digits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestMetrics {
    pub final_value: Decimal,
    pub total_contributions: Decimal,
    pub total_return_pct: Decimal,
    pub cagr: Decimal,
    pub max_drawdown: Decimal,
    pub annualized_volatility: Decimal,
    pub sharpe_ratio: Decimal,
    pub number_of_trades: usize,
}

impl BacktestMetrics {
    pub fn compute(
        equity_curve: &[EquityPoint],
        total_contributions: Decimal,
        number_of_trades: usize,
    ) -> Result<Self, StrategyLabError> {
        let final_value = match equity_curve {
            [_, .., last] => last.portfolio_value,
            _ => {
                return Err(StrategyLabError::computation(format!(
                    "need at least 2 equity points to compute metrics, got {}",
                    equity_curve.len()
                )));
            }
        };
        let returns = daily_returns(equity_curve);
        let annualized_volatility = annualized_volatility(&returns);

        Ok(BacktestMetrics {
            final_value: quantize(final_value),
            total_contributions: quantize(total_contributions),
            total_return_pct: total_return_pct(final_value, total_contributions),
            cagr: compute_cagr(equity_curve),
            max_drawdown: compute_max_drawdown(equity_curve),
            annualized_volatility,
            sharpe_ratio: sharpe_ratio(&returns, annualized_volatility),
            number_of_trades,
        })
    }
}

fn total_return_pct(final_value: Decimal, contributions: Decimal) -> Decimal {
    (final_value - contributions)
        .checked_div(contributions)
        .map(quantize)
        .unwrap_or(Decimal::ZERO)
}

/// `(last / first)^(365.25 / days) - 1`, or 0 when undefined.
pub fn compute_cagr(curve: &[EquityPoint]) -> Decimal {
    let (Some(first), Some(last)) = (curve.first(), curve.last()) else {
        return Decimal::ZERO;
    };
    if first.portfolio_value <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let days = (last.date - first.date).num_days();
    if days <= 0 {
        return Decimal::ZERO;
    }
    let ratio = to_f64(last.portfolio_value) / to_f64(first.portfolio_value);
    if ratio <= 0.0 {
        return Decimal::ZERO;
    }
    let years = days as f64 / DAYS_PER_YEAR;
    from_f64_quantized(ratio.powf(1.0 / years) - 1.0)
}

/// Largest peak-to-trough decline as a fraction of the peak.
pub fn compute_max_drawdown(curve: &[EquityPoint]) -> Decimal {
    let Some(first) = curve.first() else {
        return Decimal::ZERO;
    };
    let mut peak = first.portfolio_value;
    let mut max_dd = Decimal::ZERO;

    for point in curve {
        let value = point.portfolio_value;
        if value > peak {
            peak = value;
        }
        if peak > Decimal::ZERO {
            if let Some(dd) = (peak - value).checked_div(peak) {
                max_dd = max_dd.max(dd);
            }
        }
    }
    quantize(max_dd)
}

/// Simple returns between consecutive points; pairs starting at a
/// non-positive value are skipped.
pub fn daily_returns(curve: &[EquityPoint]) -> Vec<f64> {
    curve
        .windows(2)
        .filter_map(|w| {
            let prev = to_f64(w[0].portfolio_value);
            let curr = to_f64(w[1].portfolio_value);
            (prev > 0.0).then(|| (curr - prev) / prev)
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation of `returns` scaled by √252.
pub fn annualized_volatility(returns: &[f64]) -> Decimal {
    if returns.is_empty() {
        return Decimal::ZERO;
    }
    let m = mean(returns);
    let variance = returns.iter().map(|r| (r - m).powi(2)).sum::<f64>() / returns.len() as f64;
    from_f64_quantized(variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Mean daily return over annualized volatility, risk-free rate 0.
pub fn sharpe_ratio(returns: &[f64], annualized_volatility: Decimal) -> Decimal {
    if returns.is_empty() || annualized_volatility.is_zero() {
        return Decimal::ZERO;
    }
    from_f64_quantized(mean(returns) / to_f64(annualized_volatility))
}
