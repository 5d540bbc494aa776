//! JSON web API adapter.
//!
//! Exposes the strategy catalogue, batch backtests and symbol validation
//! over HTTP. Market data access is blocking, so handlers hop onto the
//! blocking pool before touching the port.

mod error;
mod handlers;

pub use error::WebError;
pub use handlers::*;

use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::domain::error::StrategyLabError;
use crate::domain::strategy::StrategyRegistry;
use crate::ports::market_data_port::MarketDataPort;

pub struct AppState {
    pub market_data: Arc<dyn MarketDataPort>,
    pub registry: Arc<StrategyRegistry>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/strategies", get(handlers::list_strategies))
        .route("/api/backtest", post(handlers::run_backtests))
        .route("/api/instruments/validate", get(handlers::validate_instrument))
        .fallback(handlers::not_found)
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), StrategyLabError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "web server listening");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
