//! HTTP error responses for the web adapter.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

use crate::domain::error::StrategyLabError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

pub fn status_from_error(err: &StrategyLabError) -> StatusCode {
    match err {
        StrategyLabError::Validation { .. }
        | StrategyLabError::UnknownStrategy { .. }
        | StrategyLabError::ConfigMissing { .. }
        | StrategyLabError::ConfigInvalid { .. }
        | StrategyLabError::ConfigParse { .. } => StatusCode::BAD_REQUEST,
        StrategyLabError::DataFetch { .. } => StatusCode::BAD_GATEWAY,
        StrategyLabError::Computation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        StrategyLabError::Serialization(_) | StrategyLabError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<StrategyLabError> for WebError {
    fn from(err: StrategyLabError) -> Self {
        Self::new(status_from_error(&err), err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(status = self.status.as_u16(), message = %self.message, "request failed");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
