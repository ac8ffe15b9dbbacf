//! Business logic services for the news sentiment feed
//!
//! This crate owns the live news cache, per-symbol request throttling and
//! recency-weighted sentiment scoring, and exposes them through
//! [`NewsFeedService`].

pub mod config;
pub mod news_cache;
pub mod news_feed_service;
pub mod rate_limiter;
pub mod sentiment_aggregator;
pub mod sentiment_calculator;

pub use config::NewsFeedConfig;
pub use news_cache::{NewsCache, NewsCacheStats, RefreshOutcome};
pub use news_feed_service::{
    NeutralReason, NewsFeedError, NewsFeedService, RequestError, SentimentReading,
};
pub use rate_limiter::{RateLimiter, RateLimiterStats};
pub use sentiment_aggregator::{SentimentAggregator, DEFAULT_DECAY_CONSTANT};
pub use sentiment_calculator::{IndicatorCalculator, IndicatorSeries, PriceBar, SentimentCalculator};
