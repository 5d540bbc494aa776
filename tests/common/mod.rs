#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use strategylab::domain::backtest::BacktestConfig;
use strategylab::domain::candle::{Candle, Instrument};
use strategylab::domain::error::StrategyLabError;
use strategylab::domain::price_series::PriceSeries;
use strategylab::domain::strategy::StrategyConfig;
use strategylab::ports::market_data_port::MarketDataPort;

pub struct MockMarketDataPort {
    pub series: HashMap<String, Arc<PriceSeries>>,
    pub errors: HashMap<String, String>,
    pub calls: AtomicUsize,
}

impl MockMarketDataPort {
    pub fn new() -> Self {
        Self {
            series: HashMap::new(),
            errors: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.series
            .insert(series.instrument().symbol.clone(), Arc::new(series));
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MarketDataPort for MockMarketDataPort {
    fn daily_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Arc<PriceSeries>, StrategyLabError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.errors.get(symbol) {
            return Err(StrategyLabError::data_fetch(symbol, reason.clone()));
        }
        let series = self
            .series
            .get(symbol)
            .ok_or_else(|| StrategyLabError::data_fetch(symbol, "no data"))?;
        let sliced = series
            .slice(start, end)
            .map_err(|e| StrategyLabError::data_fetch(symbol, e.to_string()))?;
        Ok(Arc::new(sliced))
    }

    fn validate_symbol(&self, symbol: &str) -> Option<Instrument> {
        self.series
            .get(&symbol.trim().to_uppercase())
            .map(|s| s.instrument().clone())
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Consecutive calendar days starting at `start` with the given closes.
pub fn series_from_closes(symbol: &str, start: &str, closes: &[Decimal]) -> PriceSeries {
    let start = date(start);
    let candles = closes
        .iter()
        .enumerate()
        .map(|(i, &p)| Candle::flat(start + Duration::days(i as i64), p, 1_000))
        .collect();
    PriceSeries::new(Instrument::new(symbol, symbol, "EQUITY").unwrap(), candles).unwrap()
}

/// Linear ramp from `start_price` moving by `step` per day.
pub fn trending_series(symbol: &str, start: &str, days: usize, start_price: Decimal, step: Decimal) -> PriceSeries {
    let closes: Vec<Decimal> = (0..days)
        .map(|i| start_price + step * Decimal::from(i as i64))
        .collect();
    series_from_closes(symbol, start, &closes)
}

/// Rises for `up` days, falls for `down` days, then rises again for `up` days.
pub fn up_down_up_series(symbol: &str, start: &str, up: usize, down: usize) -> PriceSeries {
    let mut closes = Vec::with_capacity(2 * up + down);
    let mut price = Decimal::from(100);
    for _ in 0..up {
        price += Decimal::ONE;
        closes.push(price);
    }
    for _ in 0..down {
        price -= Decimal::ONE;
        closes.push(price);
    }
    for _ in 0..up {
        price += Decimal::ONE;
        closes.push(price);
    }
    series_from_closes(symbol, start, &closes)
}

pub fn make_config(symbol: &str, capital: Decimal, strategy: StrategyConfig) -> BacktestConfig {
    BacktestConfig::new(symbol, date("2020-01-01"), date("2020-12-31"), capital, strategy).unwrap()
}
