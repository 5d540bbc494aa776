//! Domain error types.

/// Top-level error type for strategylab.
#[derive(Debug, thiserror::Error)]
pub enum StrategyLabError {
    #[error("invalid input: {reason}")]
    Validation { reason: String },

    #[error("unknown strategy: {id}")]
    UnknownStrategy { id: String },

    #[error("failed to fetch market data for {symbol}: {reason}")]
    DataFetch { symbol: String, reason: String },

    #[error("computation error: {reason}")]
    Computation { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StrategyLabError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn computation(reason: impl Into<String>) -> Self {
        Self::Computation {
            reason: reason.into(),
        }
    }

    pub fn data_fetch(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataFetch {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }

    /// Process exit status reported by the CLI for this error.
    pub fn exit_status(&self) -> u8 {
        match self {
            StrategyLabError::Io(_) | StrategyLabError::Serialization(_) => 1,
            StrategyLabError::ConfigParse { .. }
            | StrategyLabError::ConfigMissing { .. }
            | StrategyLabError::ConfigInvalid { .. } => 2,
            StrategyLabError::DataFetch { .. } => 3,
            StrategyLabError::Validation { .. } | StrategyLabError::UnknownStrategy { .. } => 4,
            StrategyLabError::Computation { .. } => 5,
        }
    }
}

impl From<&StrategyLabError> for std::process::ExitCode {
    fn from(err: &StrategyLabError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
