//! JSON report adapter implementing ReportPort.
//!
//! Writes `{"results": [...]}`, the same shape the web API returns.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::StrategyLabError;
use crate::ports::report_port::ReportPort;

#[derive(Serialize)]
struct Report<'a> {
    results: &'a [BacktestResult],
}

#[derive(Debug, Default)]
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, results: &[BacktestResult]) -> Result<String, StrategyLabError> {
        Ok(serde_json::to_string_pretty(&Report { results })?)
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, results: &[BacktestResult], output_path: &str) -> Result<(), StrategyLabError> {
        let path = Path::new(output_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &Report { results })?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
