//! Local CSV market data adapter.
//!
//! One file per symbol, `<base>/<SYMBOL>.csv`, with header
//! `date,open,high,low,close,volume`.

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::candle::{Candle, Instrument, normalize_symbol};
use crate::domain::error::StrategyLabError;
use crate::domain::price_series::PriceSeries;
use crate::ports::market_data_port::MarketDataPort;

const CSV_ASSET_TYPE: &str = "UNKNOWN";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> Result<PathBuf, StrategyLabError> {
        let symbol = normalize_symbol(symbol)?;
        Ok(self.base_path.join(format!("{symbol}.csv")))
    }

    fn read_candles(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Candle>, StrategyLabError> {
        let path = self.csv_path(symbol)?;
        let content = fs::read_to_string(&path).map_err(|e| {
            StrategyLabError::data_fetch(symbol, format!("failed to read {}: {e}", path.display()))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut candles = Vec::new();

        for result in rdr.records() {
            let record = result
                .map_err(|e| StrategyLabError::data_fetch(symbol, format!("CSV parse error: {e}")))?;

            let date_str = field(&record, 0, "date", symbol)?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                StrategyLabError::data_fetch(symbol, format!("invalid date format: {e}"))
            })?;

            if date < start || date > end {
                continue;
            }

            let volume_str = field(&record, 5, "volume", symbol)?;
            let volume: i64 = volume_str.parse().map_err(|e| {
                StrategyLabError::data_fetch(symbol, format!("invalid volume value: {e}"))
            })?;

            candles.push(Candle {
                date,
                open: price(&record, 1, "open", symbol)?,
                high: price(&record, 2, "high", symbol)?,
                low: price(&record, 3, "low", symbol)?,
                close: price(&record, 4, "close", symbol)?,
                volume,
            });
        }

        Ok(candles)
    }
}

fn field<'r>(
    record: &'r StringRecord,
    idx: usize,
    name: &str,
    symbol: &str,
) -> Result<&'r str, StrategyLabError> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| StrategyLabError::data_fetch(symbol, format!("missing {name} column")))
}

fn price(
    record: &StringRecord,
    idx: usize,
    name: &str,
    symbol: &str,
) -> Result<Decimal, StrategyLabError> {
    let raw = field(record, idx, name, symbol)?;
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| StrategyLabError::data_fetch(symbol, format!("invalid {name} value: {e}")))
}

impl MarketDataPort for CsvAdapter {
    fn daily_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Arc<PriceSeries>, StrategyLabError> {
        let symbol = normalize_symbol(symbol)?;
        let candles = self.read_candles(&symbol, start, end)?;
        if candles.is_empty() {
            return Err(StrategyLabError::data_fetch(
                &symbol,
                format!("no rows between {start} and {end}"),
            ));
        }
        debug!(symbol = %symbol, rows = candles.len(), "loaded CSV series");

        let instrument = Instrument::new(symbol.clone(), symbol.clone(), CSV_ASSET_TYPE)?;
        Ok(Arc::new(PriceSeries::new(instrument, candles)?))
    }

    fn validate_symbol(&self, symbol: &str) -> Option<Instrument> {
        let symbol = normalize_symbol(symbol).ok()?;
        if !self.csv_path(&symbol).ok()?.is_file() {
            return None;
        }
        Instrument::new(symbol.clone(), symbol, CSV_ASSET_TYPE).ok()
    }
}
