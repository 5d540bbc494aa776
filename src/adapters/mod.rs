//! Concrete adapter implementations for ports.

pub mod cached_market_data;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod json_report_adapter;
#[cfg(feature = "web")]
pub mod web;
pub mod yahoo_adapter;
