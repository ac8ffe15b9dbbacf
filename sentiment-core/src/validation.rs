//! Ingestion bounds for upstream articles
//!
//! Every article goes through [`NewsItem::from_raw`] before it can enter the
//! cache. An article failing any bound is rejected as a whole.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use url::Url;

use crate::error::ItemValidationError;
use crate::news::{ImpactLevel, NewsCategory, NewsItem, RawArticle, DEFAULT_LANGUAGE};
use crate::symbol::normalize_symbol;

/// Bounds applied to each upstream article
#[derive(Debug, Clone)]
pub struct ValidationLimits {
    pub max_id_len: usize,
    pub max_title_len: usize,
    pub max_summary_len: usize,
    pub max_source_len: usize,
    pub max_author_len: usize,
    pub max_url_len: usize,
    pub max_symbol_len: usize,
    pub max_related_symbols: usize,
    pub max_keywords: usize,
    pub max_keyword_len: usize,
    /// How far past `now` a publication date may lie (clock skew allowance)
    pub max_future_skew: Duration,
    /// Oldest publication date accepted, relative to `now`
    pub max_article_age: Duration,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_id_len: 100,
            max_title_len: 500,
            max_summary_len: 2000,
            max_source_len: 200,
            max_author_len: 200,
            max_url_len: 2048,
            max_symbol_len: 10,
            max_related_symbols: 50,
            max_keywords: 20,
            max_keyword_len: 50,
            max_future_skew: Duration::hours(1),
            max_article_age: Duration::days(30),
        }
    }
}

impl NewsItem {
    /// Validate an upstream record against `limits`, evaluated at `now`
    pub fn from_raw(
        raw: RawArticle,
        limits: &ValidationLimits,
        now: DateTime<Utc>,
    ) -> Result<Self, ItemValidationError> {
        let id = required("id", raw.id, limits.max_id_len)?;
        let title = required("title", raw.title, limits.max_title_len)?;
        let summary = optional("summary", raw.summary, limits.max_summary_len)?;
        let source = optional("source", raw.source, limits.max_source_len)?;
        let author = optional("author", raw.author, limits.max_author_len)?;

        let url = match optional("url", raw.url, limits.max_url_len)? {
            Some(url) => Some(validate_url(url)?),
            None => None,
        };

        let published_raw = raw
            .published_at
            .ok_or(ItemValidationError::Missing("published_at"))?;
        let published_at = DateTime::parse_from_rfc3339(published_raw.trim())
            .map_err(|_| ItemValidationError::InvalidTimestamp(published_raw.clone()))?
            .with_timezone(&Utc);
        // A bound past the representable range does not constrain anything
        if now
            .checked_add_signed(limits.max_future_skew)
            .is_some_and(|latest| published_at > latest)
        {
            return Err(ItemValidationError::PublishedInFuture(published_at.to_rfc3339()));
        }
        if now
            .checked_sub_signed(limits.max_article_age)
            .is_some_and(|oldest| published_at < oldest)
        {
            return Err(ItemValidationError::PublishedTooOld(published_at.to_rfc3339()));
        }

        let sentiment_score = raw
            .sentiment_score
            .ok_or(ItemValidationError::Missing("sentiment_score"))?;
        check_range("sentiment_score", sentiment_score, -1.0, 1.0)?;

        let sentiment_confidence = raw
            .sentiment_confidence
            .ok_or(ItemValidationError::Missing("sentiment_confidence"))?;
        check_range("sentiment_confidence", sentiment_confidence, 0.0, 1.0)?;

        let related_symbols = related_symbols(raw.related_symbols, limits)?;
        let keywords = keywords(raw.keywords, limits)?;

        let category = raw
            .category
            .as_deref()
            .map(NewsCategory::from_label)
            .unwrap_or_default();

        let impact_level = match raw.impact_level.as_deref().map(str::trim) {
            None | Some("") => ImpactLevel::default(),
            Some(label) => ImpactLevel::from_label(label)
                .ok_or_else(|| ItemValidationError::UnknownImpact(label.to_string()))?,
        };

        let language = match raw.language.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_LANGUAGE.to_string(),
            Some(code) => {
                let valid = (2..=10).contains(&code.len())
                    && code.chars().all(|c| c.is_ascii_alphabetic() || c == '-');
                if !valid {
                    return Err(ItemValidationError::InvalidLanguage(code.to_string()));
                }
                code.to_lowercase()
            }
        };

        Ok(NewsItem {
            id,
            title,
            summary,
            url,
            source,
            author,
            published_at,
            sentiment_score,
            sentiment_confidence,
            related_symbols,
            keywords,
            category,
            impact_level,
            language,
        })
    }
}

fn required(
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> Result<String, ItemValidationError> {
    optional(field, value, max)?.ok_or(ItemValidationError::Missing(field))
}

/// Trims the value; blank strings count as absent
fn optional(
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> Result<Option<String>, ItemValidationError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let len = value.chars().count();
    if len > max {
        return Err(ItemValidationError::TooLong { field, len, max });
    }
    Ok(Some(value.to_string()))
}

fn validate_url(raw: String) -> Result<String, ItemValidationError> {
    match Url::parse(&raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(raw),
        _ => Err(ItemValidationError::InvalidUrl(raw)),
    }
}

fn check_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ItemValidationError> {
    // NaN fails the contains check as well
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ItemValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

fn related_symbols(
    symbols: Vec<String>,
    limits: &ValidationLimits,
) -> Result<BTreeSet<String>, ItemValidationError> {
    let mut normalized = BTreeSet::new();
    for symbol in symbols {
        let symbol = normalize_symbol(&symbol);
        if symbol.is_empty()
            || symbol.chars().count() > limits.max_symbol_len
            || symbol.chars().any(char::is_whitespace)
        {
            return Err(ItemValidationError::InvalidSymbol(symbol));
        }
        normalized.insert(symbol);
    }
    if normalized.len() > limits.max_related_symbols {
        return Err(ItemValidationError::TooMany {
            field: "related_symbols",
            count: normalized.len(),
            max: limits.max_related_symbols,
        });
    }
    Ok(normalized)
}

fn keywords(
    keywords: Vec<String>,
    limits: &ValidationLimits,
) -> Result<Vec<String>, ItemValidationError> {
    if keywords.len() > limits.max_keywords {
        return Err(ItemValidationError::TooMany {
            field: "keywords",
            count: keywords.len(),
            max: limits.max_keywords,
        });
    }
    keywords
        .into_iter()
        .filter_map(|keyword| optional("keywords", Some(keyword), limits.max_keyword_len).transpose())
        .collect()
}
