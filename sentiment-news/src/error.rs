//! Error types for the news module

use thiserror::Error;

/// Errors that can occur while fetching from an upstream feed
#[derive(Debug, Clone, Error)]
pub enum NewsError {
    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// API returned an error response
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// Failed to parse API response
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<NewsError> for sentiment_core::SentimentError {
    fn from(err: NewsError) -> Self {
        match err {
            NewsError::InvalidConfig(msg) => sentiment_core::SentimentError::config(msg),
            other => sentiment_core::SentimentError::upstream(other.to_string()),
        }
    }
}
