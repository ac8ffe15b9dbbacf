//! Error types for the sentiment feed

use thiserror::Error;

/// Feed-wide error type
#[derive(Error, Debug)]
pub enum SentimentError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limit exceeded for symbol {symbol}")]
    Throttled { symbol: String },

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SentimentError {
    pub fn validation(msg: impl Into<String>) -> Self {
        SentimentError::Validation(msg.into())
    }

    pub fn throttled(symbol: impl Into<String>) -> Self {
        SentimentError::Throttled {
            symbol: symbol.into(),
        }
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        SentimentError::Upstream(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        SentimentError::Config(msg.into())
    }
}

/// Result type alias for sentiment operations
pub type SentimentResult<T> = Result<T, SentimentError>;

/// Reason a single upstream article was dropped at ingestion
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ItemValidationError {
    #[error("missing required field `{0}`")]
    Missing(&'static str),

    #[error("field `{field}` is {len} chars, max {max}")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("field `{field}` has {count} entries, max {max}")]
    TooMany {
        field: &'static str,
        count: usize,
        max: usize,
    },

    #[error("invalid url `{0}`: must be absolute http or https")]
    InvalidUrl(String),

    #[error("unparseable published_at `{0}`")]
    InvalidTimestamp(String),

    #[error("published_at {0} is too far in the future")]
    PublishedInFuture(String),

    #[error("published_at {0} is older than the historical bound")]
    PublishedTooOld(String),

    #[error("{field} {value} outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid related symbol `{0}`")]
    InvalidSymbol(String),

    #[error("unknown impact level `{0}`")]
    UnknownImpact(String),

    #[error("invalid language code `{0}`")]
    InvalidLanguage(String),

    #[error("duplicate article id `{0}` in batch")]
    DuplicateId(String),
}
