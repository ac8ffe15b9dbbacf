//! Sentiment score endpoint

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use sentiment_core::normalize_symbol;
use sentiment_services::NeutralReason;

use super::WindowQuery;
use crate::AppState;

#[derive(Debug, Serialize)]
struct SentimentResponse {
    symbol: String,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    score: f64,
    articles: usize,
    neutral_reason: Option<NeutralReason>,
}

/// Create sentiment routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/sentiment/{symbol}", get(get_sentiment))
}

/// GET /api/sentiment/{symbol} - Recency-weighted score. Bad input reads as neutral.
async fn get_sentiment(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<WindowQuery>,
) -> Json<SentimentResponse> {
    let (from, to) = params.resolve();
    let reading = state.news_feed.evaluate_sentiment(&symbol, from, to).await;

    Json(SentimentResponse {
        symbol: normalize_symbol(&symbol),
        from,
        to,
        score: reading.value(),
        articles: reading.articles(),
        neutral_reason: reading.neutral_reason(),
    })
}
