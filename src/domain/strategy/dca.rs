//! Dollar Cost Averaging: invest the initial capital on day 0, then a fixed
//! amount every `frequency_days` trading days. Never sells.

use rust_decimal::Decimal;

use super::{DcaConfig, Strategy, StrategyConfig, StrategyExecution, StrategyId};
use crate::domain::error::StrategyLabError;
use crate::domain::portfolio::Holdings;
use crate::domain::price_series::PriceSeries;

#[derive(Debug, Clone)]
pub struct DollarCostAveraging {
    config: DcaConfig,
}

impl DollarCostAveraging {
    pub fn new(config: DcaConfig) -> Self {
        Self { config }
    }
}

impl Strategy for DollarCostAveraging {
    fn id(&self) -> StrategyId {
        StrategyId::Dca
    }

    fn config(&self) -> StrategyConfig {
        StrategyConfig::Dca(self.config)
    }

    fn execute(
        &self,
        series: &PriceSeries,
        initial_capital: Decimal,
    ) -> Result<StrategyExecution, StrategyLabError> {
        let amount = self.config.contribution_amount;
        let frequency = self.config.frequency_days;

        let mut holdings = Holdings::new(initial_capital);
        let mut equity_curve = Vec::with_capacity(series.len());
        let mut trades = Vec::new();
        let mut days_since_contribution = 0usize;

        for (i, candle) in series.candles().iter().enumerate() {
            if i == 0 {
                let reason = format!("Initial investment of {}", holdings.cash);
                trades.push(holdings.buy_all(candle, reason)?);
            } else {
                days_since_contribution += 1;
                if days_since_contribution >= frequency {
                    holdings.deposit(amount)?;
                    let reason = format!("DCA contribution of {amount}");
                    trades.push(holdings.buy_all(candle, reason)?);
                    days_since_contribution = 0;
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
