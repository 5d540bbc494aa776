//! Equity points, trades and the per-run cash/share accumulator.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::candle::Candle;
use crate::domain::decimal::{checked, quantize_equity, shares_for};
use crate::domain::error::StrategyLabError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub portfolio_value: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub date: NaiveDate,
    pub action: TradeAction,
    pub quantity: Decimal,
    pub price: Decimal,
    pub reason: String,
}

/// Cash and fractional shares owned by a single strategy run.
///
/// Never shared between runs; every strategy builds its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Holdings {
    pub cash: Decimal,
    pub shares: Decimal,
}

impl Holdings {
    pub fn new(initial_capital: Decimal) -> Self {
        Holdings {
            cash: initial_capital,
            shares: Decimal::ZERO,
        }
    }

    pub fn deposit(&mut self, amount: Decimal) -> Result<(), StrategyLabError> {
        self.cash = checked(self.cash.checked_add(amount), "cash balance")?;
        Ok(())
    }

    /// Converts all cash into shares at the candle's close.
    pub fn buy_all(&mut self, candle: &Candle, reason: String) -> Result<Trade, StrategyLabError> {
        let quantity = shares_for(self.cash, candle.close)?;
        self.shares = checked(self.shares.checked_add(quantity), "share count")?;
        self.cash = Decimal::ZERO;
        Ok(Trade {
            date: candle.date,
            action: TradeAction::Buy,
            quantity,
            price: candle.close,
            reason,
        })
    }

    /// Liquidates all shares at the candle's close.
    pub fn sell_all(&mut self, candle: &Candle, reason: String) -> Result<Trade, StrategyLabError> {
        let quantity = self.shares;
        let proceeds = checked(quantity.checked_mul(candle.close), "sale proceeds")?;
        self.cash = checked(self.cash.checked_add(proceeds), "cash balance")?;
        self.shares = Decimal::ZERO;
        Ok(Trade {
            date: candle.date,
            action: TradeAction::Sell,
            quantity,
            price: candle.close,
            reason,
        })
    }

    /// Portfolio value at the candle's close, in cents.
    pub fn mark(&self, candle: &Candle) -> Result<EquityPoint, StrategyLabError> {
        let value = self
            .shares
            .checked_mul(candle.close)
            .and_then(|held| held.checked_add(self.cash));
        Ok(EquityPoint {
            date: candle.date,
            portfolio_value: quantize_equity(checked(value, "portfolio value")?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn candle(close: Decimal) -> Candle {
        Candle::flat(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(), close, 1000)
    }

    #[test]
    fn new_holdings_are_all_cash() {
        let h = Holdings::new(dec!(10000));
        assert_eq!(h.cash, dec!(10000));
        assert_eq!(h.shares, Decimal::ZERO);
        assert_eq!(h.mark(&candle(dec!(50))).unwrap().portfolio_value, dec!(10000));
    }

    #[test]
    fn buy_all_moves_cash_into_shares() {
        let mut h = Holdings::new(dec!(10000));
        let trade = h.buy_all(&candle(dec!(100)), "test".into()).unwrap();
        assert_eq!(trade.action, TradeAction::Buy);
        assert_eq!(trade.quantity, dec!(100));
        assert_eq!(trade.price, dec!(100));
        assert_eq!(h.cash, Decimal::ZERO);
        assert_eq!(h.shares, dec!(100));
    }

    #[test]
    fn sell_all_moves_shares_into_cash() {
        let mut h = Holdings::new(dec!(10000));
        h.buy_all(&candle(dec!(100)), "in".into()).unwrap();
        let trade = h.sell_all(&candle(dec!(120)), "out".into()).unwrap();
        assert_eq!(trade.action, TradeAction::Sell);
        assert_eq!(trade.quantity, dec!(100));
        assert_eq!(h.cash, dec!(12000));
        assert_eq!(h.shares, Decimal::ZERO);
    }

    #[test]
    fn deposit_then_mark() {
        let mut h = Holdings::new(dec!(1000));
        h.buy_all(&candle(dec!(100)), "in".into()).unwrap();
        h.deposit(dec!(500)).unwrap();
        assert_eq!(h.mark(&candle(dec!(110))).unwrap().portfolio_value, dec!(1600));
    }

    #[test]
    fn mark_rounds_to_cents() {
        let mut h = Holdings::new(dec!(1000));
        h.buy_all(&candle(dec!(3)), "in".into()).unwrap();
        assert_eq!(h.mark(&candle(dec!(3))).unwrap().portfolio_value, dec!(1000.00));
    }

    #[test]
    fn overflowing_deposit_is_computation_error() {
        let mut h = Holdings::new(Decimal::MAX);
        let err = h.deposit(Decimal::ONE).unwrap_err();
        assert!(matches!(err, StrategyLabError::Computation { .. }));
        assert_eq!(h.cash, Decimal::MAX);
    }

    #[test]
    fn overflowing_mark_is_computation_error() {
        let mut h = Holdings::new(dec!(50000000000000000000000000000));
        h.buy_all(&candle(dec!(1)), "in".into()).unwrap();
        let err = h.mark(&candle(dec!(2))).unwrap_err();
        assert!(matches!(err, StrategyLabError::Computation { .. }));
    }

    #[test]
    fn trade_action_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&TradeAction::Buy).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::to_string(&TradeAction::Sell).unwrap(), "\"SELL\"");
    }
}
