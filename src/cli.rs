//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use crate::adapters::cached_market_data::CachedMarketData;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::adapters::yahoo_adapter::{DEFAULT_BASE_URL, DEFAULT_SERIES_ATTEMPTS, YahooAdapter};
use crate::domain::backtest::{BacktestConfig, BacktestResult};
use crate::domain::comparison::run_comparison;
use crate::domain::error::StrategyLabError;
use crate::domain::strategy::{ParameterType, StrategyId, StrategyRegistry};
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "strategylab",
    about = "Backtest simple investment strategies on daily price history"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every strategy listed in a config file
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Overrides `[backtest] symbol`
        #[arg(long)]
        symbol: Option<String>,
        /// Write results as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// List available strategies and their parameters
    Strategies,
    /// Check that a symbol resolves with the configured data source
    ValidateSymbol {
        #[arg(long)]
        symbol: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Start the web server
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let registry = StrategyRegistry::standard();
    let outcome = match cli.command {
        Command::Backtest {
            config,
            symbol,
            output,
            dry_run,
        } => run_backtest(&config, symbol.as_deref(), output.as_deref(), dry_run, &registry),
        Command::Strategies => {
            print_strategies(&registry);
            Ok(())
        }
        Command::ValidateSymbol { symbol, config } => run_validate_symbol(&symbol, config.as_deref()),
        Command::Serve { config } => return run_serve(&config, registry),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StrategyLabError> {
    FileConfigAdapter::from_file(path).map_err(|e| StrategyLabError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn run_backtest(
    config_path: &Path,
    symbol_override: Option<&str>,
    output: Option<&Path>,
    dry_run: bool,
    registry: &StrategyRegistry,
) -> Result<(), StrategyLabError> {
    info!(path = %config_path.display(), "loading config");
    let config = load_config(config_path)?;

    let mut configs = build_backtest_configs(&config, registry)?;
    if let Some(symbol) = symbol_override {
        configs = configs
            .iter()
            .map(|c| c.with_symbol(symbol))
            .collect::<Result<_, _>>()?;
    }

    if dry_run {
        for c in &configs {
            println!(
                "{} {} {}..{} capital {}",
                c.strategy_id(),
                c.symbol(),
                c.start_date(),
                c.end_date(),
                c.initial_capital()
            );
        }
        println!("Dry run complete: configuration is valid");
        return Ok(());
    }

    let market_data = build_market_data(Some(&config as &dyn ConfigPort))?;
    info!(runs = configs.len(), "running backtests");
    let results = run_comparison(market_data.as_ref(), &configs)?;

    for result in &results {
        print_summary(result);
    }

    if let Some(path) = output {
        JsonReportAdapter::new().write(&results, &path.to_string_lossy())?;
        info!(path = %path.display(), "report written");
    }
    Ok(())
}

/// One validated config per strategy listed in `[backtest] strategies`.
///
/// Parameters come from the section named after each strategy id; missing
/// keys take the registry's default values.
pub fn build_backtest_configs(
    config: &dyn ConfigPort,
    registry: &StrategyRegistry,
) -> Result<Vec<BacktestConfig>, StrategyLabError> {
    let symbol = required(config, "backtest", "symbol")?;
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;

    let capital_str = required(config, "backtest", "initial_capital")?;
    let initial_capital =
        Decimal::from_str(capital_str.trim()).map_err(|_| StrategyLabError::ConfigInvalid {
            section: "backtest".into(),
            key: "initial_capital".into(),
            reason: format!("not a number: {capital_str}"),
        })?;

    let ids = resolve_strategy_ids(config, registry);
    if ids.is_empty() {
        return Err(StrategyLabError::ConfigInvalid {
            section: "backtest".into(),
            key: "strategies".into(),
            reason: "no strategies listed".into(),
        });
    }

    ids.iter()
        .map(|raw| {
            let id = StrategyId::from_str(raw)?;
            let params = registry.with_defaults(id, &config.get_section(id.as_str()));
            let strategy = registry.resolve(id.as_str(), &params)?;
            BacktestConfig::new(&symbol, start_date, end_date, initial_capital, strategy)
        })
        .collect()
}

/// Strategy ids from `[backtest] strategies`, or every registered strategy.
pub fn resolve_strategy_ids(config: &dyn ConfigPort, registry: &StrategyRegistry) -> Vec<String> {
    match config.get_string("backtest", "strategies") {
        Some(list) => list
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => registry
            .strategies()
            .iter()
            .map(|info| info.id.to_string())
            .collect(),
    }
}

fn required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, StrategyLabError> {
    config
        .get_string(section, key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| StrategyLabError::ConfigMissing {
            section: section.into(),
            key: key.into(),
        })
}

fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<NaiveDate, StrategyLabError> {
    let raw = required(config, "backtest", key)?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| StrategyLabError::ConfigInvalid {
        section: "backtest".into(),
        key: key.into(),
        reason: "invalid date format (expected YYYY-MM-DD)".into(),
    })
}

/// Market data source from `[data]`, wrapped in the memoizing cache.
///
/// Without a config this is Yahoo Finance with default settings.
pub fn build_market_data(
    config: Option<&dyn ConfigPort>,
) -> Result<Arc<dyn MarketDataPort>, StrategyLabError> {
    let get = |key: &str| config.and_then(|c| c.get_string("data", key));
    let source = get("source").unwrap_or_else(|| "yahoo".to_string());

    match source.trim().to_lowercase().as_str() {
        "yahoo" => {
            let base_url = get("base_url").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
            let attempts = config
                .map(|c| c.get_int("data", "max_attempts", DEFAULT_SERIES_ATTEMPTS as i64))
                .unwrap_or(DEFAULT_SERIES_ATTEMPTS as i64);
            let attempts = u32::try_from(attempts).ok().filter(|&a| a > 0).ok_or_else(|| {
                StrategyLabError::ConfigInvalid {
                    section: "data".into(),
                    key: "max_attempts".into(),
                    reason: format!("must be a positive integer, got {attempts}"),
                }
            })?;
            info!(base_url = %base_url, attempts, "using Yahoo Finance market data");
            let yahoo = YahooAdapter::new(&base_url, attempts)?;
            Ok(Arc::new(CachedMarketData::new(yahoo)))
        }
        "csv" => {
            let dir = get("csv_dir").ok_or_else(|| StrategyLabError::ConfigMissing {
                section: "data".into(),
                key: "csv_dir".into(),
            })?;
            info!(dir = %dir, "using CSV market data");
            Ok(Arc::new(CachedMarketData::new(CsvAdapter::new(PathBuf::from(dir)))))
        }
        other => Err(StrategyLabError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("unknown source '{other}' (expected yahoo or csv)"),
        }),
    }
}

fn print_strategies(registry: &StrategyRegistry) {
    for info in registry.strategies() {
        println!("{} - {}", info.id, info.display_name);
        println!("  {}", info.description);
        for p in &info.parameters {
            let kind = match p.param_type {
                ParameterType::Integer => "integer",
                ParameterType::Number => "number",
            };
            println!(
                "  {:<20} {:<8} default {:<6} {}",
                p.name, kind, p.default_value, p.description
            );
        }
    }
}

pub fn format_summary(result: &BacktestResult) -> String {
    let m = &result.metrics;
    let pct = |d: Decimal| d * Decimal::ONE_HUNDRED;
    format!(
        "=== {} on {} ===\n\
         Final Value:         {:.2}\n\
         Contributions:       {:.2}\n\
         Total Return:        {:.2}%\n\
         CAGR:                {:.2}%\n\
         Max Drawdown:        -{:.2}%\n\
         Volatility:          {:.2}%\n\
         Sharpe Ratio:        {:.4}\n\
         Trades:              {}",
        result.strategy_id,
        result.symbol,
        m.final_value,
        m.total_contributions,
        pct(m.total_return_pct),
        pct(m.cagr),
        pct(m.max_drawdown),
        pct(m.annualized_volatility),
        m.sharpe_ratio,
        m.number_of_trades
    )
}

fn print_summary(result: &BacktestResult) {
    println!("{}\n", format_summary(result));
}

fn run_validate_symbol(symbol: &str, config_path: Option<&Path>) -> Result<(), StrategyLabError> {
    let config = config_path.map(load_config).transpose()?;
    let market_data = build_market_data(config.as_ref().map(|c| c as &dyn ConfigPort))?;

    match market_data.validate_symbol(symbol) {
        Some(instrument) => {
            println!(
                "{}: {} ({})",
                instrument.symbol, instrument.name, instrument.asset_type
            );
            Ok(())
        }
        None => Err(StrategyLabError::validation(format!(
            "Symbol not found or not fetchable: {}",
            symbol.trim().to_uppercase()
        ))),
    }
}

fn run_serve(config_path: &Path, registry: StrategyRegistry) -> ExitCode {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{AppState, serve};
        use std::net::SocketAddr;

        let started = (|| -> Result<(), StrategyLabError> {
            info!(path = %config_path.display(), "loading config");
            let config = load_config(config_path)?;
            let market_data = build_market_data(Some(&config as &dyn ConfigPort))?;

            let listen = config
                .get_string("web", "listen")
                .unwrap_or_else(|| "127.0.0.1:8080".to_string());
            let addr: SocketAddr =
                listen
                    .trim()
                    .parse()
                    .map_err(|_| StrategyLabError::ConfigInvalid {
                        section: "web".into(),
                        key: "listen".into(),
                        reason: format!("not a socket address: {listen}"),
                    })?;

            let state = AppState {
                market_data,
                registry: Arc::new(registry),
            };
            tokio::runtime::Runtime::new()?.block_on(serve(state, addr))
        })();

        match started {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e}");
                (&e).into()
            }
        }
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = (config_path, registry);
        eprintln!("error: web feature is required for serve");
        ExitCode::from(1)
    }
}
