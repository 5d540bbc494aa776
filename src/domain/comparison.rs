//! Comparison mode: several backtests evaluated side by side.
//!
//! Each run owns its accumulator state and reads an immutable series, so
//! runs are executed in parallel without coordination.

use rayon::prelude::*;

use crate::domain::backtest::{BacktestConfig, BacktestResult, run_configured};
use crate::domain::error::StrategyLabError;
use crate::ports::market_data_port::MarketDataPort;

/// Fetches the series for each config and runs it. Results come back in
/// input order; the first failure aborts the comparison.
pub fn run_comparison(
    market_data: &dyn MarketDataPort,
    configs: &[BacktestConfig],
) -> Result<Vec<BacktestResult>, StrategyLabError> {
    if configs.is_empty() {
        return Err(StrategyLabError::validation(
            "at least one backtest is required",
        ));
    }

    configs
        .par_iter()
        .map(|config| {
            let series =
                market_data.daily_series(config.symbol(), config.start_date(), config.end_date())?;
            run_configured(&series, config)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candle::{Candle, Instrument};
    use crate::domain::price_series::PriceSeries;
    use crate::domain::strategy::{
        BuyAndHoldConfig, DcaConfig, MaCrossoverConfig, StrategyConfig, StrategyId,
    };
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    struct FixedSeries;

    impl MarketDataPort for FixedSeries {
        fn daily_series(
            &self,
            symbol: &str,
            start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Arc<PriceSeries>, StrategyLabError> {
            if symbol == "MISSING" {
                return Err(StrategyLabError::data_fetch(symbol, "no data"));
            }
            let candles = (0..80)
                .map(|i| {
                    let price = Decimal::from(100 + (i % 20));
                    Candle::flat(start + chrono::Duration::days(i), price, 1000)
                })
                .collect();
            let instrument = Instrument::new(symbol, symbol, "EQUITY")?;
            Ok(Arc::new(PriceSeries::new(instrument, candles)?))
        }

        fn validate_symbol(&self, _symbol: &str) -> Option<Instrument> {
            None
        }
    }

    fn config(symbol: &str, strategy: StrategyConfig) -> BacktestConfig {
        BacktestConfig::new(
            symbol,
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 6, 1).unwrap(),
            dec!(10000),
            strategy,
        )
        .unwrap()
    }

    #[test]
    fn results_keep_input_order() {
        let configs = vec![
            config("AAA", StrategyConfig::MaCrossover(MaCrossoverConfig::new(5, 20).unwrap())),
            config("AAA", StrategyConfig::BuyAndHold(BuyAndHoldConfig)),
            config("BBB", StrategyConfig::Dca(DcaConfig::new(dec!(100), 5).unwrap())),
        ];
        let results = run_comparison(&FixedSeries, &configs).unwrap();

        let ids: Vec<StrategyId> = results.iter().map(|r| r.strategy_id).collect();
        assert_eq!(
            ids,
            vec![StrategyId::MaCrossover, StrategyId::BuyAndHold, StrategyId::Dca]
        );
        assert_eq!(results[2].symbol, "BBB");
        assert!(results.iter().all(|r| r.equity_curve.len() == 80));
    }

    #[test]
    fn empty_comparison_is_rejected() {
        let err = run_comparison(&FixedSeries, &[]).unwrap_err();
        assert!(matches!(err, StrategyLabError::Validation { .. }));
    }

    #[test]
    fn fetch_failure_propagates() {
        let configs = vec![
            config("AAA", StrategyConfig::BuyAndHold(BuyAndHoldConfig)),
            config("MISSING", StrategyConfig::BuyAndHold(BuyAndHoldConfig)),
        ];
        let err = run_comparison(&FixedSeries, &configs).unwrap_err();
        assert!(matches!(err, StrategyLabError::DataFetch { ref symbol, .. } if symbol == "MISSING"));
    }
}
