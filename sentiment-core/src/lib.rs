//! Core types for the news sentiment feed
//!
//! This crate defines the shared data structures used across the feed:
//! validated news articles, ingestion bounds, symbol validation and the
//! feed-wide error type.

pub mod error;
pub mod news;
pub mod symbol;
pub mod validation;

pub use error::{ItemValidationError, SentimentError, SentimentResult};
pub use news::{ImpactLevel, NewsCategory, NewsItem, RawArticle, DEFAULT_LANGUAGE};
pub use symbol::{normalize_symbol, DefaultSymbolValidator, SymbolValidator};
pub use validation::ValidationLimits;
