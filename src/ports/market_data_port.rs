//! Market data provider port.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::candle::Instrument;
use crate::domain::error::StrategyLabError;
use crate::domain::price_series::PriceSeries;

/// Source of daily price history.
///
/// Implementations must be safe to share across threads; comparison mode
/// and the web layer call them concurrently.
pub trait MarketDataPort: Send + Sync {
    /// Daily candles for `symbol` within `[start, end]`.
    ///
    /// Fails with [`StrategyLabError::DataFetch`] when the source is
    /// unreachable, malformed, or has no data in range.
    fn daily_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Arc<PriceSeries>, StrategyLabError>;

    /// `None` when the symbol cannot be resolved.
    fn validate_symbol(&self, symbol: &str) -> Option<Instrument>;
}
