//! Backtest engine: run one strategy over one series and score it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::candle::normalize_symbol;
use crate::domain::error::StrategyLabError;
use crate::domain::metrics::BacktestMetrics;
use crate::domain::portfolio::{EquityPoint, Trade};
use crate::domain::price_series::PriceSeries;
use crate::domain::strategy::config::Contributions;
use crate::domain::strategy::{Strategy, StrategyConfig, StrategyId};

/// Validated parameters for a single run. Only constructible through
/// [`BacktestConfig::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    symbol: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    initial_capital: Decimal,
    strategy: StrategyConfig,
}

impl BacktestConfig {
    pub fn new(
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        initial_capital: Decimal,
        strategy: StrategyConfig,
    ) -> Result<Self, StrategyLabError> {
        let symbol = normalize_symbol(symbol)?;
        if start_date >= end_date {
            return Err(StrategyLabError::validation(format!(
                "start date {start_date} must be before end date {end_date}"
            )));
        }
        if initial_capital <= Decimal::ZERO {
            return Err(StrategyLabError::validation(format!(
                "initial capital must be positive, got {initial_capital}"
            )));
        }
        Ok(Self {
            symbol,
            start_date,
            end_date,
            initial_capital,
            strategy,
        })
    }

    /// Same run against another symbol.
    pub fn with_symbol(&self, symbol: &str) -> Result<Self, StrategyLabError> {
        Self::new(
            symbol,
            self.start_date,
            self.end_date,
            self.initial_capital,
            self.strategy,
        )
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn initial_capital(&self) -> Decimal {
        self.initial_capital
    }

    pub fn strategy(&self) -> StrategyConfig {
        self.strategy
    }

    pub fn strategy_id(&self) -> StrategyId {
        self.strategy.id()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub strategy_id: StrategyId,
    pub symbol: String,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
    pub metrics: BacktestMetrics,
}

/// Executes `strategy` on `series` and computes metrics.
///
/// Total contributions come from the strategy's own configuration.
pub fn run_backtest(
    strategy: &dyn Strategy,
    series: &PriceSeries,
    config: &BacktestConfig,
) -> Result<BacktestResult, StrategyLabError> {
    let execution = strategy.execute(series, config.initial_capital)?;
    let trade_count = execution.trades.len();
    let total_contributions = strategy
        .config()
        .total_contributions(config.initial_capital, trade_count)?;
    let metrics = BacktestMetrics::compute(&execution.equity_curve, total_contributions, trade_count)?;

    Ok(BacktestResult {
        strategy_id: strategy.id(),
        symbol: config.symbol.clone(),
        equity_curve: execution.equity_curve,
        trades: execution.trades,
        metrics,
    })
}

/// Builds the strategy named by `config` and runs it.
pub fn run_configured(
    series: &PriceSeries,
    config: &BacktestConfig,
) -> Result<BacktestResult, StrategyLabError> {
    let strategy = config.strategy.build();
    run_backtest(strategy.as_ref(), series, config)
}
