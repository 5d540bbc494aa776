//! Moving Average Crossover.
//!
//! Fully invested while SMA(short) > SMA(long), fully in cash otherwise.
//! Trades only when the signal flips.

use rust_decimal::Decimal;

use super::{MaCrossoverConfig, Strategy, StrategyConfig, StrategyExecution, StrategyId};
use crate::domain::error::StrategyLabError;
use crate::domain::portfolio::Holdings;
use crate::domain::price_series::PriceSeries;
use crate::domain::sma::calculate_sma;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exposure {
    InCash,
    Invested,
}

#[derive(Debug, Clone)]
pub struct MaCrossover {
    config: MaCrossoverConfig,
}

impl MaCrossover {
    pub fn new(config: MaCrossoverConfig) -> Self {
        Self { config }
    }
}

impl Strategy for MaCrossover {
    fn id(&self) -> StrategyId {
        StrategyId::MaCrossover
    }

    fn config(&self) -> StrategyConfig {
        StrategyConfig::MaCrossover(self.config)
    }

    fn execute(
        &self,
        series: &PriceSeries,
        initial_capital: Decimal,
    ) -> Result<StrategyExecution, StrategyLabError> {
        let short_window = self.config.short_window;
        let long_window = self.config.long_window;

        let closes = series.closes();
        let short_sma = calculate_sma(&closes, short_window)?;
        let long_sma = calculate_sma(&closes, long_window)?;

        let mut holdings = Holdings::new(initial_capital);
        let mut exposure = Exposure::InCash;
        let mut equity_curve = Vec::with_capacity(series.len());
        let mut trades = Vec::new();

        for (i, candle) in series.candles().iter().enumerate() {
            if let (Some(short), Some(long)) = (short_sma[i], long_sma[i]) {
                let bullish = short > long;
                match exposure {
                    Exposure::InCash if bullish => {
                        let reason =
                            format!("SMA({short_window}) crossed above SMA({long_window})");
                        trades.push(holdings.buy_all(candle, reason)?);
                        exposure = Exposure::Invested;
                    }
                    Exposure::Invested if !bullish => {
                        let reason =
                            format!("SMA({short_window}) crossed below SMA({long_window})");
                        trades.push(holdings.sell_all(candle, reason)?);
                        exposure = Exposure::InCash;
                    }
                    _ => {}
                }
            }
            equity_curve.push(holdings.mark(candle)?);
        }

        Ok(StrategyExecution {
            equity_curve,
            trades,
        })
    }
}
