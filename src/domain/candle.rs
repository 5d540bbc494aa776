//! Daily candle and instrument representation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::error::StrategyLabError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
}

impl Candle {
    /// Candle where open, high, low and close all equal `price`.
    pub fn flat(date: NaiveDate, price: Decimal, volume: i64) -> Self {
        Candle {
            date,
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
        }
    }
}

/// Trimmed, upper-cased ticker. Rejects blanks and anything that could
/// escape a directory when used as a file name.
pub fn normalize_symbol(raw: &str) -> Result<String, StrategyLabError> {
    let symbol = raw.trim();
    if symbol.is_empty() {
        return Err(StrategyLabError::validation("symbol must not be blank"));
    }
    if symbol.contains(['/', '\\']) || symbol.contains("..") {
        return Err(StrategyLabError::validation(format!(
            "symbol contains path characters: {symbol}"
        )));
    }
    Ok(symbol.to_uppercase())
}

/// A tradeable instrument (stock, ETF, crypto, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub symbol: String,
    pub name: String,
    pub asset_type: String,
}

impl Instrument {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        asset_type: impl Into<String>,
    ) -> Result<Self, StrategyLabError> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(StrategyLabError::validation(
                "symbol must not be blank",
            ));
        }
        Ok(Instrument {
            symbol,
            name: name.into(),
            asset_type: asset_type.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn flat_candle() {
        let c = Candle::flat(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(), dec!(101.5), 500);
        assert_eq!(c.open, dec!(101.5));
        assert_eq!(c.high, dec!(101.5));
        assert_eq!(c.low, dec!(101.5));
        assert_eq!(c.close, dec!(101.5));
        assert_eq!(c.volume, 500);
    }

    #[test]
    fn instrument_rejects_blank_symbol() {
        assert!(Instrument::new("  ", "Nothing", "EQUITY").is_err());
        let spy = Instrument::new("SPY", "SPDR S&P 500", "ETF").unwrap();
        assert_eq!(spy.symbol, "SPY");
    }

    #[test]
    fn normalize_symbol_trims_and_uppercases() {
        assert_eq!(normalize_symbol(" brk.b ").unwrap(), "BRK.B");
        assert_eq!(normalize_symbol("^gspc").unwrap(), "^GSPC");
        assert!(normalize_symbol("   ").is_err());
    }

    #[test]
    fn normalize_symbol_rejects_path_segments() {
        for raw in ["../etc/passwd", "a/b", "..", "c:\\x", "spy..csv"] {
            let err = normalize_symbol(raw).unwrap_err();
            assert!(matches!(err, StrategyLabError::Validation { .. }), "{raw}");
        }
    }

    #[test]
    fn instrument_serializes_camel_case() {
        let spy = Instrument::new("SPY", "SPDR S&P 500", "ETF").unwrap();
        let json = serde_json::to_string(&spy).unwrap();
        assert!(json.contains("\"assetType\":\"ETF\""));
    }
}
