//! Yahoo Finance v8 chart client.
//!
//! Daily candles come from `/v8/finance/chart/{symbol}`. Requests are retried
//! with exponential backoff; any remaining failure surfaces as
//! [`StrategyLabError::DataFetch`].

use std::str::FromStr;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Days, NaiveDate, Utc};
use reqwest::Url;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::candle::{Candle, Instrument};
use crate::domain::error::StrategyLabError;
use crate::domain::price_series::PriceSeries;
use crate::ports::market_data_port::MarketDataPort;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_SERIES_ATTEMPTS: u32 = 3;
const VALIDATE_ATTEMPTS: u32 = 2;
const VALIDATE_LOOKBACK_DAYS: u64 = 7;
const UNKNOWN_ASSET_TYPE: &str = "UNKNOWN";
const USER_AGENT: &str = "Mozilla/5.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: Option<Indicators>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: Option<String>,
    short_name: Option<String>,
    instrument_type: Option<String>,
    gmtoffset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    base_url: Url,
    max_attempts: u32,
    base_delay: Duration,
}

impl YahooAdapter {
    pub fn new(base_url: &str, max_attempts: u32) -> Result<Self, StrategyLabError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StrategyLabError::data_fetch("*", format!("failed to build HTTP client: {e}")))?;
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| StrategyLabError::ConfigInvalid {
                section: "data".into(),
                key: "base_url".into(),
                reason: format!("not an absolute URL: {base_url}"),
            })?;
        Ok(Self {
            client,
            base_url,
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(500),
        })
    }

    /// Backoff before retry `n` is `base_delay * 2^n`.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    fn chart_url(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Url, StrategyLabError> {
        let period1 = epoch_seconds(start);
        let period2 = epoch_seconds(end.checked_add_days(Days::new(1)).unwrap_or(end));
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                StrategyLabError::data_fetch(symbol, format!("unusable base URL {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(["v8", "finance", "chart"])
            .push(symbol);
        url.set_query(Some(&format!("period1={period1}&period2={period2}&interval=1d")));
        Ok(url)
    }

    fn fetch_with_retry(
        &self,
        symbol: &str,
        url: &str,
        max_attempts: u32,
    ) -> Result<String, StrategyLabError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!(symbol, attempt, url, "requesting chart");
            match self.fetch_once(url) {
                Ok(body) => return Ok(body),
                Err(e) if attempt >= max_attempts => {
                    return Err(StrategyLabError::data_fetch(
                        symbol,
                        format!("failed after {max_attempts} attempts: {e}"),
                    ));
                }
                Err(e) => {
                    warn!(symbol, attempt, max_attempts, error = %e, "chart request failed, retrying");
                    thread::sleep(self.base_delay * 2u32.saturating_pow(attempt));
                }
            }
        }
    }

    fn fetch_once(&self, url: &str) -> Result<String, reqwest::Error> {
        self.client.get(url).send()?.error_for_status()?.text()
    }
}

impl MarketDataPort for YahooAdapter {
    fn daily_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Arc<PriceSeries>, StrategyLabError> {
        let url = self.chart_url(symbol, start, end)?;
        let body = self.fetch_with_retry(symbol, url.as_str(), self.max_attempts)?;
        parse_chart_response(symbol, &body).map(Arc::new)
    }

    fn validate_symbol(&self, symbol: &str) -> Option<Instrument> {
        let end = Utc::now().date_naive();
        let start = end.checked_sub_days(Days::new(VALIDATE_LOOKBACK_DAYS))?;
        match self
            .chart_url(symbol, start, end)
            .and_then(|url| self.fetch_with_retry(symbol, url.as_str(), VALIDATE_ATTEMPTS))
            .and_then(|body| parse_instrument(symbol, &body))
        {
            Ok(instrument) => Some(instrument),
            Err(e) => {
                warn!(symbol, error = %e, "symbol validation failed");
                None
            }
        }
    }
}

fn epoch_seconds(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

fn first_result(symbol: &str, body: &str) -> Result<ChartResult, StrategyLabError> {
    let envelope: ChartEnvelope = serde_json::from_str(body).map_err(|e| {
        StrategyLabError::data_fetch(symbol, format!("malformed chart response: {e}"))
    })?;
    envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| StrategyLabError::data_fetch(symbol, "no chart data returned"))
}

fn parse_instrument(symbol: &str, body: &str) -> Result<Instrument, StrategyLabError> {
    let meta = first_result(symbol, body)?.meta;
    let resolved = meta.symbol.unwrap_or_else(|| symbol.to_uppercase());
    let name = meta.short_name.unwrap_or_else(|| resolved.clone());
    let asset_type = meta
        .instrument_type
        .unwrap_or_else(|| UNKNOWN_ASSET_TYPE.to_string());
    Instrument::new(resolved, name, asset_type)
}

/// Builds a series from a v8 chart payload.
///
/// Adjusted closes win over raw closes; rows without a close are skipped.
pub fn parse_chart_response(symbol: &str, body: &str) -> Result<PriceSeries, StrategyLabError> {
    let result = first_result(symbol, body)?;
    let timestamps = result
        .timestamp
        .ok_or_else(|| StrategyLabError::data_fetch(symbol, "no timestamps in response"))?;
    let indicators = result.indicators.unwrap_or_default();
    let quote = indicators.quote.into_iter().next().unwrap_or_default();
    let adj_closes = indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .unwrap_or_default();
    let offset = result.meta.gmtoffset.unwrap_or(0);

    let mut candles = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let Some(raw_close) = at(&quote.close, i) else {
            continue;
        };
        let Some(date) = DateTime::from_timestamp(ts + offset, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        let close = at(&adj_closes, i).unwrap_or(raw_close);
        candles.push(Candle {
            date,
            open: to_decimal(at(&quote.open, i)),
            high: to_decimal(at(&quote.high, i)),
            low: to_decimal(at(&quote.low, i)),
            close: to_decimal(Some(close)),
            volume: at(&quote.volume, i).map(|v| v as i64).unwrap_or(0),
        });
    }

    if candles.is_empty() {
        return Err(StrategyLabError::data_fetch(symbol, "no valid candles parsed"));
    }

    let upper = symbol.to_uppercase();
    let name = result.meta.short_name.unwrap_or_else(|| upper.clone());
    let asset_type = result
        .meta
        .instrument_type
        .unwrap_or_else(|| UNKNOWN_ASSET_TYPE.to_string());
    PriceSeries::new(Instrument::new(upper, name, asset_type)?, candles)
}

fn at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten().filter(|v| v.is_finite())
}

fn to_decimal(value: Option<f64>) -> Decimal {
    value
        .and_then(|v| Decimal::from_str(&v.to_string()).ok().or_else(|| Decimal::from_f64(v)))
        .unwrap_or(Decimal::ZERO)
}
