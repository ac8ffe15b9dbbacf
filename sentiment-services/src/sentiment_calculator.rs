//! News sentiment as a price-aligned indicator
//!
//! Places the sentiment score on the same timeline as other indicators: one
//! value per price bar, computed over a lookback window ending at the bar.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use sentiment_core::SentimentResult;

use crate::news_feed_service::NewsFeedService;

/// Indicator name the sentiment score is recorded under
pub const SENTIMENT_INDICATOR: &str = "NewsSentiment";

/// One OHLCV bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Indicator values keyed by bar timestamp, then indicator name
pub type IndicatorSeries = BTreeMap<DateTime<Utc>, HashMap<String, f64>>;

/// Anything that turns a price series into indicator values
#[async_trait]
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &str;

    async fn calculate(&self, symbol: &str, bars: &[PriceBar]) -> SentimentResult<IndicatorSeries>;
}

/// Scores news sentiment at every bar timestamp
pub struct SentimentCalculator {
    service: Arc<NewsFeedService>,
    lookback: Duration,
}

impl SentimentCalculator {
    /// Create a calculator with a 24 hour lookback
    pub fn new(service: Arc<NewsFeedService>) -> Self {
        Self::with_lookback(service, Duration::hours(24))
    }

    pub fn with_lookback(service: Arc<NewsFeedService>, lookback: Duration) -> Self {
        Self { service, lookback }
    }
}

#[async_trait]
impl IndicatorCalculator for SentimentCalculator {
    fn name(&self) -> &str {
        SENTIMENT_INDICATOR
    }

    #[instrument(skip(self, bars), fields(bars = bars.len()))]
    async fn calculate(&self, symbol: &str, bars: &[PriceBar]) -> SentimentResult<IndicatorSeries> {
        let evaluations = bars.iter().map(|bar| {
            let to = bar.timestamp;
            let from = to - self.lookback;
            async move { (to, self.service.get_sentiment_score(symbol, from, to).await) }
        });

        let series: IndicatorSeries = join_all(evaluations)
            .await
            .into_iter()
            .map(|(timestamp, score)| {
                (
                    timestamp,
                    HashMap::from([(SENTIMENT_INDICATOR.to_string(), score)]),
                )
            })
            .collect();

        debug!("Computed {} sentiment values for {}", series.len(), symbol);
        Ok(series)
    }
}
