//! Runtime configuration for the news feed service

use std::str::FromStr;

use chrono::{Duration, Utc};
use sentiment_core::{SentimentError, SentimentResult, ValidationLimits};

use crate::sentiment_aggregator::DEFAULT_DECAY_CONSTANT;

/// Configuration for NewsFeedService
#[derive(Debug, Clone)]
pub struct NewsFeedConfig {
    /// Maximum age of the cached batch before a refresh is attempted
    pub cache_ttl: Duration,
    /// Admitted news queries per symbol per second
    pub rate_limit_per_second: u32,
    /// Articles kept from one upstream batch; the rest are dropped
    pub max_articles_per_refresh: usize,
    /// How far past now a query window may end
    pub max_future_skew: Duration,
    /// Exponential recency decay per hour
    pub decay_constant: f64,
    /// Per-article ingestion bounds
    pub limits: ValidationLimits,
}

impl Default for NewsFeedConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::minutes(5),
            rate_limit_per_second: 10,
            max_articles_per_refresh: 10_000,
            max_future_skew: Duration::hours(1),
            decay_constant: DEFAULT_DECAY_CONSTANT,
            limits: ValidationLimits::default(),
        }
    }
}

impl NewsFeedConfig {
    /// Build a config from `NEWS_*` / `SENTIMENT_*` environment variables,
    /// falling back to defaults for unset ones
    pub fn from_env() -> SentimentResult<Self> {
        let mut config = Self::default();

        if let Some(secs) = env_parse::<i64>("NEWS_CACHE_TTL_SECS")? {
            config.cache_ttl = env_duration("NEWS_CACHE_TTL_SECS", Duration::try_seconds(secs))?;
        }
        if let Some(rps) = env_parse::<u32>("NEWS_RATE_LIMIT_PER_SECOND")? {
            config.rate_limit_per_second = rps;
        }
        if let Some(max) = env_parse::<usize>("NEWS_MAX_ARTICLES_PER_REFRESH")? {
            config.max_articles_per_refresh = max;
        }
        if let Some(days) = env_parse::<i64>("NEWS_MAX_ARTICLE_AGE_DAYS")? {
            config.limits.max_article_age =
                env_duration("NEWS_MAX_ARTICLE_AGE_DAYS", Duration::try_days(days))?;
        }
        if let Some(secs) = env_parse::<i64>("NEWS_MAX_FUTURE_SKEW_SECS")? {
            config.max_future_skew =
                env_duration("NEWS_MAX_FUTURE_SKEW_SECS", Duration::try_seconds(secs))?;
        }
        if let Some(k) = env_parse::<f64>("SENTIMENT_DECAY_CONSTANT")? {
            config.decay_constant = k;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the service misbehave
    pub fn validate(&self) -> SentimentResult<()> {
        if self.cache_ttl < Duration::zero() {
            return Err(SentimentError::config("cache TTL must not be negative"));
        }
        if self.max_articles_per_refresh == 0 {
            return Err(SentimentError::config(
                "max articles per refresh must be positive",
            ));
        }
        if self.max_future_skew < Duration::zero() {
            return Err(SentimentError::config("future skew must not be negative"));
        }
        if self.limits.max_article_age <= Duration::zero() {
            return Err(SentimentError::config("max article age must be positive"));
        }
        // Bounds are applied as offsets from the current time
        let now = Utc::now();
        if now.checked_sub_signed(self.limits.max_article_age).is_none() {
            return Err(SentimentError::config("max article age is out of range"));
        }
        if now.checked_add_signed(self.max_future_skew).is_none()
            || now.checked_add_signed(self.limits.max_future_skew).is_none()
        {
            return Err(SentimentError::config("future skew is out of range"));
        }
        if !self.decay_constant.is_finite() || self.decay_constant < 0.0 {
            return Err(SentimentError::config(format!(
                "decay constant must be a non-negative number, got {}",
                self.decay_constant
            )));
        }
        Ok(())
    }
}

fn env_duration(key: &str, duration: Option<Duration>) -> SentimentResult<Duration> {
    duration.ok_or_else(|| SentimentError::config(format!("{} is out of range", key)))
}

fn env_parse<T>(key: &str) -> SentimentResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| SentimentError::config(format!("{}={:?}: {}", key, value, e))),
        Err(_) => Ok(None),
    }
}
