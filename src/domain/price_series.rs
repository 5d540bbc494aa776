//! Date-sorted daily price series for one instrument.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::candle::{Candle, Instrument};
use crate::domain::error::StrategyLabError;

/// Immutable, non-empty, ascending-by-date sequence of candles.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    instrument: Instrument,
    candles: Vec<Candle>,
}

impl PriceSeries {
    pub fn new(instrument: Instrument, mut candles: Vec<Candle>) -> Result<Self, StrategyLabError> {
        if candles.is_empty() {
            return Err(StrategyLabError::validation(format!(
                "price series for {} must not be empty",
                instrument.symbol
            )));
        }
        candles.sort_by_key(|c| c.date);
        Ok(Self {
            instrument,
            candles,
        })
    }

    /// Sub-series restricted to `[start, end]` inclusive.
    pub fn slice(&self, start: NaiveDate, end: NaiveDate) -> Result<Self, StrategyLabError> {
        let candles: Vec<Candle> = self
            .candles
            .iter()
            .filter(|c| c.date >= start && c.date <= end)
            .cloned()
            .collect();
        if candles.is_empty() {
            return Err(StrategyLabError::validation(format!(
                "no candles in range [{start}, {end}] for {}",
                self.instrument.symbol
            )));
        }
        Ok(Self {
            instrument: self.instrument.clone(),
            candles,
        })
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn first(&self) -> &Candle {
        &self.candles[0]
    }

    pub fn start_date(&self) -> NaiveDate {
        self.candles[0].date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.candles[self.candles.len() - 1].date
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn candle_at(&self, date: NaiveDate) -> Option<&Candle> {
        self.candles
            .binary_search_by_key(&date, |c| c.date)
            .ok()
            .map(|i| &self.candles[i])
    }

    pub fn closes(&self) -> Vec<Decimal> {
        self.candles.iter().map(|c| c.close).collect()
    }
}
