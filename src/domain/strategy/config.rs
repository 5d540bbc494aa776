//! Typed, validated strategy configurations.
//!
//! [`StrategyConfig`] is a closed set of variants. Each variant knows the total
//! capital it contributes over a run, so the engine never inspects which
//! strategy it is running.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::{BuyAndHold, DollarCostAveraging, MaCrossover, Strategy, StrategyId, StrategyParams};
use crate::domain::decimal::checked;
use crate::domain::error::StrategyLabError;

/// Capital contributed over a whole run.
pub trait Contributions {
    fn total_contributions(
        &self,
        initial_capital: Decimal,
        trade_count: usize,
    ) -> Result<Decimal, StrategyLabError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuyAndHoldConfig;

impl Contributions for BuyAndHoldConfig {
    fn total_contributions(
        &self,
        initial_capital: Decimal,
        _trade_count: usize,
    ) -> Result<Decimal, StrategyLabError> {
        Ok(initial_capital)
    }
}

/// `contribution_amount` is invested every `frequency_days` trading days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DcaConfig {
    pub contribution_amount: Decimal,
    pub frequency_days: usize,
}

impl DcaConfig {
    /// The initial investment is the first BUY; every later BUY is one contribution.
    const INITIAL_TRADE_COUNT: usize = 1;

    pub fn new(contribution_amount: Decimal, frequency_days: i64) -> Result<Self, StrategyLabError> {
        if contribution_amount <= Decimal::ZERO {
            return Err(StrategyLabError::validation(
                "contributionAmount must be a positive number",
            ));
        }
        if frequency_days <= 0 {
            return Err(StrategyLabError::validation(
                "frequencyDays must be a positive integer",
            ));
        }
        Ok(Self {
            contribution_amount,
            frequency_days: frequency_days as usize,
        })
    }

    pub fn from_params(params: &StrategyParams) -> Result<Self, StrategyLabError> {
        let amount = required(params, "contributionAmount")?;
        let frequency = required(params, "frequencyDays")?;
        Self::new(
            parse_number("contributionAmount", amount)?,
            parse_integer("frequencyDays", frequency)?,
        )
    }
}

impl Contributions for DcaConfig {
    fn total_contributions(
        &self,
        initial_capital: Decimal,
        trade_count: usize,
    ) -> Result<Decimal, StrategyLabError> {
        let contributions = trade_count.saturating_sub(Self::INITIAL_TRADE_COUNT);
        let added = self
            .contribution_amount
            .checked_mul(Decimal::from(contributions))
            .and_then(|added| initial_capital.checked_add(added));
        checked(added, "total contributions")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaCrossoverConfig {
    pub short_window: usize,
    pub long_window: usize,
}

impl MaCrossoverConfig {
    pub fn new(short_window: i64, long_window: i64) -> Result<Self, StrategyLabError> {
        if short_window <= 0 {
            return Err(StrategyLabError::validation(
                "shortWindow must be a positive integer",
            ));
        }
        if long_window <= 0 {
            return Err(StrategyLabError::validation(
                "longWindow must be a positive integer",
            ));
        }
        if short_window >= long_window {
            return Err(StrategyLabError::validation(
                "shortWindow must be less than longWindow",
            ));
        }
        Ok(Self {
            short_window: short_window as usize,
            long_window: long_window as usize,
        })
    }

    pub fn from_params(params: &StrategyParams) -> Result<Self, StrategyLabError> {
        let short = required(params, "shortWindow")?;
        let long = required(params, "longWindow")?;
        Self::new(
            parse_integer("shortWindow", short)?,
            parse_integer("longWindow", long)?,
        )
    }
}

impl Contributions for MaCrossoverConfig {
    fn total_contributions(
        &self,
        initial_capital: Decimal,
        _trade_count: usize,
    ) -> Result<Decimal, StrategyLabError> {
        Ok(initial_capital)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyConfig {
    BuyAndHold(BuyAndHoldConfig),
    Dca(DcaConfig),
    MaCrossover(MaCrossoverConfig),
}

impl StrategyConfig {
    pub fn id(&self) -> StrategyId {
        match self {
            StrategyConfig::BuyAndHold(_) => StrategyId::BuyAndHold,
            StrategyConfig::Dca(_) => StrategyId::Dca,
            StrategyConfig::MaCrossover(_) => StrategyId::MaCrossover,
        }
    }

    /// Executable strategy for this configuration.
    pub fn build(self) -> Box<dyn Strategy> {
        match self {
            StrategyConfig::BuyAndHold(c) => Box::new(BuyAndHold::new(c)),
            StrategyConfig::Dca(c) => Box::new(DollarCostAveraging::new(c)),
            StrategyConfig::MaCrossover(c) => Box::new(MaCrossover::new(c)),
        }
    }
}

impl Contributions for StrategyConfig {
    fn total_contributions(
        &self,
        initial_capital: Decimal,
        trade_count: usize,
    ) -> Result<Decimal, StrategyLabError> {
        match self {
            StrategyConfig::BuyAndHold(c) => c.total_contributions(initial_capital, trade_count),
            StrategyConfig::Dca(c) => c.total_contributions(initial_capital, trade_count),
            StrategyConfig::MaCrossover(c) => c.total_contributions(initial_capital, trade_count),
        }
    }
}

fn required<'a>(params: &'a StrategyParams, name: &str) -> Result<&'a str, StrategyLabError> {
    match params.get(name).map(|v| v.trim()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(StrategyLabError::validation(format!(
            "Missing required parameter: {name}"
        ))),
    }
}

fn parse_number(name: &str, raw: &str) -> Result<Decimal, StrategyLabError> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| StrategyLabError::validation(format!("{name} must be a valid number: {raw}")))
}

fn parse_integer(name: &str, raw: &str) -> Result<i64, StrategyLabError> {
    raw.parse::<i64>()
        .map_err(|_| StrategyLabError::validation(format!("{name} must be a valid integer: {raw}")))
}
