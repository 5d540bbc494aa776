//! Core domain types and logic.

pub mod backtest;
pub mod candle;
pub mod comparison;
pub mod decimal;
pub mod error;
pub mod metrics;
pub mod portfolio;
pub mod price_series;
pub mod sma;
pub mod strategy;
