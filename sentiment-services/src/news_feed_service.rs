//! News Feed Service
//!
//! Serves per-symbol news and sentiment scores from the live cache.
//!
//! Two entry points with different strictness:
//! - [`NewsFeedService::get_news_for_symbol`] is rate limited and returns
//!   validation and throttling failures as errors.
//! - [`NewsFeedService::get_sentiment_score`] is not rate limited and never
//!   fails; anything that makes a score meaningless yields neutral 0.
//!
//! Both refresh the cache first when it is stale. A failed refresh is
//! logged and the last good snapshot is served.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use sentiment_core::{
    normalize_symbol, DefaultSymbolValidator, NewsItem, SentimentError, SymbolValidator,
};
use sentiment_news::{NewsError, NewsSource};

use crate::config::NewsFeedConfig;
use crate::news_cache::{NewsCache, NewsCacheStats, RefreshOutcome};
use crate::rate_limiter::{RateLimiter, RateLimiterStats};
use crate::sentiment_aggregator::SentimentAggregator;

/// Why a sentiment query produced the neutral score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NeutralReason {
    InvalidSymbol,
    InvalidRange,
    RangeInFuture,
    NoArticles,
}

/// Outcome of a lenient sentiment query
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SentimentReading {
    /// Score over `articles` cached articles
    Scored { score: f64, articles: usize },
    Neutral(NeutralReason),
}

impl SentimentReading {
    /// Numeric value; neutral readings are 0
    pub fn value(&self) -> f64 {
        match self {
            SentimentReading::Scored { score, .. } => *score,
            SentimentReading::Neutral(_) => 0.0,
        }
    }

    pub fn articles(&self) -> usize {
        match self {
            SentimentReading::Scored { articles, .. } => *articles,
            SentimentReading::Neutral(_) => 0,
        }
    }

    pub fn neutral_reason(&self) -> Option<NeutralReason> {
        match self {
            SentimentReading::Scored { .. } => None,
            SentimentReading::Neutral(reason) => Some(*reason),
        }
    }
}

/// News service for symbol-level news and sentiment
pub struct NewsFeedService {
    cache: NewsCache,
    rate_limiter: RateLimiter,
    aggregator: SentimentAggregator,
    validator: Arc<dyn SymbolValidator>,
    config: NewsFeedConfig,
}

impl NewsFeedService {
    /// Create a service with the default symbol validator
    pub fn new(source: Arc<dyn NewsSource>, config: NewsFeedConfig) -> Self {
        Self::with_validator(source, Arc::new(DefaultSymbolValidator), config)
    }

    pub fn with_validator(
        source: Arc<dyn NewsSource>,
        validator: Arc<dyn SymbolValidator>,
        config: NewsFeedConfig,
    ) -> Self {
        info!(
            "Initializing NewsFeedService (ttl: {}s, rate limit: {}/s, decay: {})",
            config.cache_ttl.num_seconds(),
            config.rate_limit_per_second,
            config.decay_constant
        );
        Self {
            cache: NewsCache::new(
                source,
                config.limits.clone(),
                config.max_articles_per_refresh,
            ),
            rate_limiter: RateLimiter::new(config.rate_limit_per_second),
            aggregator: SentimentAggregator::new(config.decay_constant),
            validator,
            config,
        }
    }

    /// Cached news for `symbol` published within `[from, to]`.
    ///
    /// Fails on an invalid symbol or range and when the symbol's request
    /// budget for the current second is spent.
    #[instrument(skip(self))]
    pub async fn get_news_for_symbol(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<NewsItem>, NewsFeedError> {
        let now = Utc::now();
        let symbol = self.validate_request(symbol, from, to, now)?;

        if !self.rate_limiter.admit(&symbol, now) {
            return Err(NewsFeedError::RateLimited { symbol });
        }

        self.ensure_fresh(now).await;
        let items = self.cache.lookup(&symbol, from, to);
        debug!("Serving {} cached articles for {}", items.len(), symbol);
        Ok(items)
    }

    /// Recency-weighted sentiment of `symbol` over `[from, to]`, evaluated at `to`.
    ///
    /// Never fails: invalid input or an empty window yields 0.
    pub async fn get_sentiment_score(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> f64 {
        self.evaluate_sentiment(symbol, from, to).await.value()
    }

    /// Same as [`Self::get_sentiment_score`] but says why a result is neutral
    #[instrument(skip(self))]
    pub async fn evaluate_sentiment(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> SentimentReading {
        let now = Utc::now();
        let symbol = match self.validate_request(symbol, from, to, now) {
            Ok(symbol) => symbol,
            Err(e) => {
                warn!("Returning neutral sentiment: {}", e);
                return SentimentReading::Neutral(NeutralReason::from(&e));
            }
        };

        self.ensure_fresh(now).await;
        let items = self.cache.lookup(&symbol, from, to);
        if items.is_empty() {
            return SentimentReading::Neutral(NeutralReason::NoArticles);
        }

        SentimentReading::Scored {
            score: self.aggregator.score(&items, to),
            articles: items.len(),
        }
    }

    /// Force a refresh regardless of staleness
    pub async fn refresh_now(&self) -> Result<usize, NewsFeedError> {
        Ok(self.cache.refresh().await?)
    }

    pub fn cache_stats(&self) -> NewsCacheStats {
        self.cache.stats()
    }

    pub fn rate_limiter_stats(&self) -> RateLimiterStats {
        self.rate_limiter.stats()
    }

    /// Returns the normalized symbol. No side effects.
    fn validate_request(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<String, RequestError> {
        let normalized = normalize_symbol(symbol);
        if !self.validator.is_valid(&normalized) {
            return Err(RequestError::InvalidSymbol(symbol.to_string()));
        }
        if from > to {
            return Err(RequestError::InvalidRange { from, to });
        }
        // An unrepresentable bound does not constrain anything
        if now
            .checked_add_signed(self.config.max_future_skew)
            .is_some_and(|latest| to > latest)
        {
            return Err(RequestError::RangeInFuture { to });
        }
        Ok(normalized)
    }

    /// Refresh when stale; failures leave the previous snapshot in place
    async fn ensure_fresh(&self, now: DateTime<Utc>) {
        match self.cache.refresh_if_stale(now, self.config.cache_ttl).await {
            Ok(RefreshOutcome::Refreshed(count)) => {
                debug!("Cache refreshed with {} articles", count);
            }
            Ok(RefreshOutcome::AlreadyFresh) => {}
            Err(e) => {
                warn!("Serving stale news cache after refresh failure: {}", e);
            }
        }
    }
}

/// Query input the service refuses to evaluate
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    #[error("Invalid range: from {from} is after to {to}")]
    InvalidRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    #[error("Range end {to} is too far in the future")]
    RangeInFuture { to: DateTime<Utc> },
}

#[derive(Debug, thiserror::Error)]
pub enum NewsFeedError {
    #[error(transparent)]
    InvalidRequest(#[from] RequestError),

    #[error("Rate limit exceeded for {symbol}")]
    RateLimited { symbol: String },

    #[error("Refresh failed: {0}")]
    Refresh(#[from] NewsError),
}

impl NewsFeedError {
    /// Whether the caller's input was at fault
    pub fn is_validation(&self) -> bool {
        matches!(self, NewsFeedError::InvalidRequest(_))
    }
}

impl From<&RequestError> for NeutralReason {
    fn from(err: &RequestError) -> Self {
        match err {
            RequestError::InvalidSymbol(_) => NeutralReason::InvalidSymbol,
            RequestError::InvalidRange { .. } => NeutralReason::InvalidRange,
            RequestError::RangeInFuture { .. } => NeutralReason::RangeInFuture,
        }
    }
}

impl From<NewsFeedError> for SentimentError {
    fn from(err: NewsFeedError) -> Self {
        match err {
            NewsFeedError::RateLimited { symbol } => SentimentError::throttled(symbol),
            NewsFeedError::Refresh(e) => e.into(),
            NewsFeedError::InvalidRequest(e) => SentimentError::validation(e.to_string()),
        }
    }
}
