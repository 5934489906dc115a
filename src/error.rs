//! Error types for the engine, the rate feed and startup config.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("division by zero: {0} is zero")]
    DivisionByZero(&'static str),
}

impl EngineError {
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidInput(_) => "invalid_input",
            EngineError::DivisionByZero(_) => "division_by_zero",
        }
    }
}

/// Failure of a single feed lookup. Never leaves the rate source.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed URL cannot take a path: {0}")]
    BadBase(String),

    #[error("feed returned status {0}")]
    Status(u16),

    #[error("feed rejected request: {0}")]
    Rejected(String),

    #[error("feed has no rate for {0}")]
    MissingRate(String),

    #[error("feed rate for {code} is unusable: {value}")]
    BadRate { code: String, value: f64 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be a number, got {value:?}")]
    NotANumber { key: &'static str, value: String },

    #[error("{key} must be > 0, got {value}")]
    NonPositive { key: &'static str, value: f64 },

    #[error("{key} is out of range: {value}")]
    OutOfRange { key: &'static str, value: f64 },

    #[error("{key} is not a valid URL: {source}")]
    BadUrl {
        key: &'static str,
        #[source]
        source: url::ParseError,
    },
}
