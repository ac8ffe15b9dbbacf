//! News data structures for symbol-level sentiment

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Language assumed when the upstream record carries none
pub const DEFAULT_LANGUAGE: &str = "en";

/// Editorial category of an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsCategory {
    #[default]
    General,
    Earnings,
    Analyst,
    MergersAcquisitions,
    Regulatory,
    Product,
    Macro,
    Market,
    Other,
}

impl NewsCategory {
    /// Parse an upstream category label. Unknown labels map to `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "" | "general" | "news" => NewsCategory::General,
            "earnings" | "earnings_report" => NewsCategory::Earnings,
            "analyst" | "analyst_rating" | "rating" => NewsCategory::Analyst,
            "mergers_acquisitions" | "m&a" | "merger" | "acquisition" => {
                NewsCategory::MergersAcquisitions
            }
            "regulatory" | "legal" | "sec_filing" => NewsCategory::Regulatory,
            "product" | "product_launch" => NewsCategory::Product,
            "macro" | "economy" | "economic" => NewsCategory::Macro,
            "market" | "markets" => NewsCategory::Market,
            _ => NewsCategory::Other,
        }
    }
}

/// Expected market impact of an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl ImpactLevel {
    /// Parse an upstream impact label, `None` for unrecognized labels
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "low" => Some(ImpactLevel::Low),
            "medium" | "moderate" => Some(ImpactLevel::Medium),
            "high" => Some(ImpactLevel::High),
            "critical" => Some(ImpactLevel::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ImpactLevel::Low => "low",
            ImpactLevel::Medium => "medium",
            ImpactLevel::High => "high",
            ImpactLevel::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// Article record exactly as delivered by an upstream provider.
///
/// Nothing here is trusted. Use [`NewsItem::from_raw`] to turn it into a
/// validated [`NewsItem`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawArticle {
    pub id: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
    pub author: Option<String>,
    /// RFC 3339 timestamp; parsed during validation so a single malformed
    /// date drops one article rather than the whole batch
    pub published_at: Option<String>,
    pub sentiment_score: Option<f64>,
    pub sentiment_confidence: Option<f64>,
    pub related_symbols: Vec<String>,
    pub keywords: Vec<String>,
    pub category: Option<String>,
    pub impact_level: Option<String>,
    pub language: Option<String>,
}

/// A validated news article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Provider identifier, unique within a refresh batch
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub published_at: DateTime<Utc>,
    /// Precomputed sentiment (-1.0 - 1.0)
    pub sentiment_score: f64,
    /// Confidence in the sentiment score (0.0 - 1.0)
    pub sentiment_confidence: f64,
    /// Normalized (upper-case) symbols this article is about
    pub related_symbols: BTreeSet<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub category: NewsCategory,
    pub impact_level: ImpactLevel,
    pub language: String,
}

impl NewsItem {
    /// Whether the article was published within `[from, to]`, inclusive
    pub fn published_within(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.published_at >= from && self.published_at <= to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_labels() {
        assert_eq!(NewsCategory::from_label("Earnings"), NewsCategory::Earnings);
        assert_eq!(NewsCategory::from_label("M&A"), NewsCategory::MergersAcquisitions);
        assert_eq!(NewsCategory::from_label("product-launch"), NewsCategory::Product);
        assert_eq!(NewsCategory::from_label(""), NewsCategory::General);
        assert_eq!(NewsCategory::from_label("weather"), NewsCategory::Other);
    }

    #[test]
    fn test_impact_labels() {
        assert_eq!(ImpactLevel::from_label(" HIGH "), Some(ImpactLevel::High));
        assert_eq!(ImpactLevel::from_label("moderate"), Some(ImpactLevel::Medium));
        assert_eq!(ImpactLevel::from_label("huge"), None);
        assert!(ImpactLevel::Critical > ImpactLevel::Low);
    }

    #[test]
    fn test_raw_article_deserializes_camel_case() {
        let json = r#"{
            "id": "a1",
            "title": "Apple beats estimates",
            "publishedAt": "2024-05-01T12:00:00Z",
            "sentimentScore": 0.6,
            "sentimentConfidence": 0.9,
            "relatedSymbols": ["aapl"]
        }"#;
        let raw: RawArticle = serde_json::from_str(json).unwrap();
        assert_eq!(raw.id.as_deref(), Some("a1"));
        assert_eq!(raw.sentiment_score, Some(0.6));
        assert_eq!(raw.related_symbols, vec!["aapl".to_string()]);
        assert!(raw.keywords.is_empty());
        assert!(raw.language.is_none());
    }
}
