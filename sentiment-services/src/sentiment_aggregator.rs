//! Recency-weighted sentiment aggregation

use chrono::{DateTime, Utc};
use sentiment_core::NewsItem;

/// Per-hour decay applied to article weights
pub const DEFAULT_DECAY_CONSTANT: f64 = 0.1;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Weighted mean of article sentiment with exponential recency decay.
///
/// Each article weighs `exp(-k * hours_ago)` where `hours_ago` is measured
/// from the evaluation instant and floored at zero. Articles whose score is
/// outside `[-1, 1]` are skipped. No articles, or no usable weight, yields 0.
#[derive(Debug, Clone, Copy)]
pub struct SentimentAggregator {
    decay_constant: f64,
}

impl Default for SentimentAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_DECAY_CONSTANT)
    }
}

impl SentimentAggregator {
    pub fn new(decay_constant: f64) -> Self {
        Self { decay_constant }
    }

    /// Weight of an article published at `published_at`, seen from `at`
    pub fn weight(&self, published_at: DateTime<Utc>, at: DateTime<Utc>) -> f64 {
        let hours_ago =
            (at.signed_duration_since(published_at).num_milliseconds() as f64 / MILLIS_PER_HOUR)
                .max(0.0);
        (-self.decay_constant * hours_ago).exp()
    }

    /// Aggregate score of `items` evaluated at `at`, in `[-1, 1]`
    pub fn score(&self, items: &[NewsItem], at: DateTime<Utc>) -> f64 {
        let mut weighted_sum = 0.0;
        let mut weight_sum = 0.0;

        for item in items {
            if !(-1.0..=1.0).contains(&item.sentiment_score) {
                continue;
            }
            let weight = self.weight(item.published_at, at);
            weighted_sum += weight * item.sentiment_score;
            weight_sum += weight;
        }

        if weight_sum > 0.0 {
            (weighted_sum / weight_sum).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}
