//! HTTP request handlers for the web adapter.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::domain::backtest::{BacktestConfig, BacktestResult};
use crate::domain::candle::Instrument;
use crate::domain::comparison::run_comparison;
use crate::domain::error::StrategyLabError;
use crate::domain::strategy::{StrategyInfo, StrategyParams, StrategyRegistry};

use super::{AppState, WebError};

/// One backtest in a batch request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestRequest {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: Decimal,
    pub strategy_id: String,
    /// Values may be JSON strings or numbers.
    #[serde(default)]
    pub strategy_params: BTreeMap<String, serde_json::Value>,
}

impl BacktestRequest {
    pub fn to_config(&self, registry: &StrategyRegistry) -> Result<BacktestConfig, StrategyLabError> {
        let params: StrategyParams = self
            .strategy_params
            .iter()
            .map(|(k, v)| {
                let raw = match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), raw)
            })
            .collect();
        let strategy = registry.resolve(&self.strategy_id, &params)?;
        BacktestConfig::new(
            &self.symbol,
            self.start_date,
            self.end_date,
            self.initial_capital,
            strategy,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct BacktestBatchRequest {
    pub backtests: Vec<BacktestRequest>,
}

#[derive(Debug, Serialize)]
pub struct BacktestBatchResponse {
    pub results: Vec<BacktestResult>,
}

#[derive(Debug, Deserialize)]
pub struct SymbolQuery {
    #[serde(default)]
    pub symbol: String,
}

pub async fn list_strategies(State(state): State<Arc<AppState>>) -> Json<Vec<StrategyInfo>> {
    Json(state.registry.strategies().into_iter().cloned().collect())
}

pub async fn run_backtests(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BacktestBatchRequest>, JsonRejection>,
) -> Result<Json<BacktestBatchResponse>, WebError> {
    let Json(batch) = payload.map_err(|e| WebError::bad_request(e.body_text()))?;
    let configs = batch
        .backtests
        .iter()
        .map(|r| r.to_config(&state.registry))
        .collect::<Result<Vec<_>, _>>()?;

    info!(count = configs.len(), "running backtest batch");
    let market_data = Arc::clone(&state.market_data);
    let results = tokio::task::spawn_blocking(move || run_comparison(market_data.as_ref(), &configs))
        .await
        .map_err(|e| WebError::internal(format!("backtest task failed: {e}")))??;

    Ok(Json(BacktestBatchResponse { results }))
}

pub async fn validate_instrument(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SymbolQuery>,
) -> Result<Json<Instrument>, WebError> {
    let symbol = query.symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(WebError::bad_request("symbol query parameter is required"));
    }

    let market_data = Arc::clone(&state.market_data);
    let lookup = symbol.clone();
    let instrument = tokio::task::spawn_blocking(move || market_data.validate_symbol(&lookup))
        .await
        .map_err(|e| WebError::internal(format!("validation task failed: {e}")))?;

    instrument
        .map(Json)
        .ok_or_else(|| WebError::bad_request(format!("Symbol not found or not fetchable: {symbol}")))
}

pub async fn not_found() -> WebError {
    WebError::not_found("Not found")
}
