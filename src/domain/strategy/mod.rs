//! Strategy variants and their shared contract.
//!
//! A strategy is a pure function from (series, capital, typed config) to an
//! equity curve plus a trade log. Metrics are computed afterwards by the
//! engine in [`crate::domain::backtest`].

pub mod buy_and_hold;
pub mod config;
pub mod dca;
pub mod ma_crossover;
pub mod registry;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::StrategyLabError;
use crate::domain::portfolio::{EquityPoint, Trade};
use crate::domain::price_series::PriceSeries;

pub use buy_and_hold::BuyAndHold;
pub use config::{BuyAndHoldConfig, DcaConfig, MaCrossoverConfig, StrategyConfig};
pub use dca::DollarCostAveraging;
pub use ma_crossover::MaCrossover;
pub use registry::{ParameterDescriptor, ParameterType, StrategyInfo, StrategyRegistry};

/// Raw, unparsed strategy parameters as supplied by a request or config file.
pub type StrategyParams = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyId {
    BuyAndHold,
    Dca,
    MaCrossover,
}

impl StrategyId {
    pub const ALL: [StrategyId; 3] = [StrategyId::BuyAndHold, StrategyId::Dca, StrategyId::MaCrossover];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::BuyAndHold => "BUY_AND_HOLD",
            StrategyId::Dca => "DCA",
            StrategyId::MaCrossover => "MA_CROSSOVER",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = StrategyLabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        StrategyId::ALL
            .into_iter()
            .find(|id| id.as_str() == normalized)
            .ok_or_else(|| StrategyLabError::UnknownStrategy { id: s.to_string() })
    }
}

/// Output of one strategy run, before metrics.
///
/// `equity_curve` holds exactly one point per input candle.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyExecution {
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
}

pub trait Strategy: Send + Sync {
    fn id(&self) -> StrategyId;

    fn config(&self) -> StrategyConfig;

    fn execute(
        &self,
        series: &PriceSeries,
        initial_capital: Decimal,
    ) -> Result<StrategyExecution, StrategyLabError>;
}
