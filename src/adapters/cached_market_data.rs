//! Memoizing decorator over any [`MarketDataPort`].
//!
//! Each cache key owns a slot guarded by its own mutex. The first caller
//! for a key fetches while holding the slot; concurrent callers for the
//! same key block on it and then read the stored value, so the delegate
//! is hit at most once per key. A failed series fetch drops its slot so the
//! map only holds loaded series. Symbol lookups are remembered whether or
//! not the symbol resolved.

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::domain::candle::Instrument;
use crate::domain::error::StrategyLabError;
use crate::domain::price_series::PriceSeries;
use crate::ports::market_data_port::MarketDataPort;

type Slot<T> = Arc<Mutex<Option<T>>>;

pub struct CachedMarketData<P> {
    inner: P,
    series: DashMap<String, Slot<Arc<PriceSeries>>>,
    instruments: DashMap<String, Slot<Option<Instrument>>>,
}

impl<P: MarketDataPort> CachedMarketData<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            series: DashMap::new(),
            instruments: DashMap::new(),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of successfully cached series.
    pub fn cached_series(&self) -> usize {
        self.series.iter().filter(|e| e.value().lock().is_some()).count()
    }
}

pub fn series_key(symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
    format!("{}:{start}:{end}:1d", symbol.trim().to_uppercase())
}

fn slot<T>(map: &DashMap<String, Slot<T>>, key: &str) -> Slot<T> {
    // Clone the Arc out so the shard lock is released before we block.
    map.entry(key.to_string()).or_default().value().clone()
}

impl<P: MarketDataPort> MarketDataPort for CachedMarketData<P> {
    fn daily_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Arc<PriceSeries>, StrategyLabError> {
        let key = series_key(symbol, start, end);
        let slot = slot(&self.series, &key);
        let mut guard = slot.lock();
        if let Some(series) = guard.as_ref() {
            debug!(key = %key, "series cache hit");
            return Ok(Arc::clone(series));
        }
        debug!(key = %key, "series cache miss");
        match self.inner.daily_series(symbol, start, end) {
            Ok(series) => {
                *guard = Some(Arc::clone(&series));
                Ok(series)
            }
            Err(err) => {
                drop(guard);
                // A slot still locked belongs to a caller that is retrying.
                self.series.remove_if(&key, |_, current| {
                    Arc::ptr_eq(current, &slot) && current.try_lock().is_some_and(|g| g.is_none())
                });
                Err(err)
            }
        }
    }

    fn validate_symbol(&self, symbol: &str) -> Option<Instrument> {
        let key = symbol.trim().to_uppercase();
        let slot = slot(&self.instruments, &key);
        let mut guard = slot.lock();
        if let Some(instrument) = guard.as_ref() {
            return instrument.clone();
        }
        let instrument = self.inner.validate_symbol(symbol);
        if instrument.is_none() {
            debug!(symbol = %key, "symbol did not resolve");
        }
        *guard = Some(instrument.clone());
        instrument
    }
}
