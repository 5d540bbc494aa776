//! Report output port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::StrategyLabError;

/// Port for persisting the results of a backtest run.
pub trait ReportPort {
    fn write(&self, results: &[BacktestResult], output_path: &str) -> Result<(), StrategyLabError>;
}
