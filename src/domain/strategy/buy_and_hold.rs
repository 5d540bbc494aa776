//! Buy & Hold: invest everything at the first close and never trade again.

use rust_decimal::Decimal;

use super::{BuyAndHoldConfig, Strategy, StrategyConfig, StrategyExecution, StrategyId};
use crate::domain::error::StrategyLabError;
use crate::domain::portfolio::Holdings;
use crate::domain::price_series::PriceSeries;

#[derive(Debug, Clone, Default)]
pub struct BuyAndHold {
    config: BuyAndHoldConfig,
}

impl BuyAndHold {
    pub fn new(config: BuyAndHoldConfig) -> Self {
        Self { config }
    }
}

impl Strategy for BuyAndHold {
    fn id(&self) -> StrategyId {
        StrategyId::BuyAndHold
    }

    fn config(&self) -> StrategyConfig {
        StrategyConfig::BuyAndHold(self.config)
    }

    fn execute(
        &self,
        series: &PriceSeries,
        initial_capital: Decimal,
    ) -> Result<StrategyExecution, StrategyLabError> {
        let mut holdings = Holdings::new(initial_capital);
        let trade = holdings.buy_all(series.first(), "Initial buy - all capital".to_string())?;

        let equity_curve = series
            .candles()
            .iter()
            .map(|c| holdings.mark(c))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StrategyExecution {
            equity_curve,
            trades: vec![trade],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candle::{Candle, Instrument};
    use crate::domain::portfolio::TradeAction;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn series(closes: &[Decimal]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, &p)| Candle::flat(start + chrono::Duration::days(i as i64), p, 1000))
            .collect();
        PriceSeries::new(Instrument::new("TEST", "Test Stock", "EQUITY").unwrap(), candles).unwrap()
    }

    #[test]
    fn equity_tracks_close() {
        let s = series(&[dec!(100), dec!(200), dec!(50)]);
        let exec = BuyAndHold::default().execute(&s, dec!(10000)).unwrap();

        let values: Vec<Decimal> = exec.equity_curve.iter().map(|p| p.portfolio_value).collect();
        assert_eq!(values, vec![dec!(10000), dec!(20000), dec!(5000)]);
    }

    #[test]
    fn exactly_one_buy_of_all_capital() {
        let s = series(&[dec!(100), dec!(200), dec!(50)]);
        let exec = BuyAndHold::default().execute(&s, dec!(10000)).unwrap();

        assert_eq!(exec.trades.len(), 1);
        let trade = &exec.trades[0];
        assert_eq!(trade.action, TradeAction::Buy);
        assert_eq!(trade.quantity, dec!(100));
        assert_eq!(trade.price, dec!(100));
        assert_eq!(trade.date, s.start_date());
    }

    #[test]
    fn single_candle_series() {
        let s = series(&[dec!(40)]);
        let exec = BuyAndHold::default().execute(&s, dec!(1000)).unwrap();
        assert_eq!(exec.equity_curve.len(), 1);
        assert_eq!(exec.trades[0].quantity, dec!(25));
    }

    #[test]
    fn zero_first_close_is_a_computation_error() {
        let s = series(&[dec!(0), dec!(10)]);
        let err = BuyAndHold::default().execute(&s, dec!(1000)).unwrap_err();
        assert!(matches!(err, StrategyLabError::Computation { .. }));
    }
}
