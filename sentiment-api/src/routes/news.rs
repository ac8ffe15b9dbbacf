//! News-related API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use sentiment_core::{normalize_symbol, NewsItem};
use sentiment_services::NewsFeedError;

use super::WindowQuery;
use crate::AppState;

/// News for one symbol over a window
#[derive(Debug, Serialize)]
struct SymbolNewsResponse {
    symbol: String,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    items: Vec<NewsItem>,
    total_count: usize,
}

/// Create news routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/news/{symbol}", get(get_symbol_news))
        .route("/admin/refresh", post(refresh_news))
}

/// GET /api/news/{symbol} - Cached news for a symbol, rate limited per symbol
async fn get_symbol_news(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<WindowQuery>,
) -> impl IntoResponse {
    let (from, to) = params.resolve();

    match state.news_feed.get_news_for_symbol(&symbol, from, to).await {
        Ok(items) => {
            let response = SymbolNewsResponse {
                symbol: normalize_symbol(&symbol),
                from,
                to,
                total_count: items.len(),
                items,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let status = match &e {
                NewsFeedError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                e if e.is_validation() => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            warn!("News request for {} failed: {}", symbol, e);
            (
                status,
                Json(serde_json::json!({
                    "error": e.to_string()
                })),
            )
                .into_response()
        }
    }
}

/// POST /api/admin/refresh - Force a cache refresh from the upstream feed
async fn refresh_news(State(state): State<AppState>) -> impl IntoResponse {
    match state.news_feed.refresh_now().await {
        Ok(count) => {
            info!("Manual refresh cached {} articles", count);
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "cached_items": count,
                    "cache": state.news_feed.cache_stats(),
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!("Manual refresh failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({
                    "error": e.to_string()
                })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{send, test_app};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_symbol_news() {
        let app = test_app(10);

        let (status, body) = send(&app, "GET", "/api/news/aapl").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["symbol"], "AAPL");
        assert_eq!(body["total_count"], 2);
        assert_eq!(body["items"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_requests_are_bad_requests() {
        let app = test_app(10);

        let (status, body) = send(&app, "GET", "/api/news/NOT%20A%20SYMBOL").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Invalid symbol"));

        let (status, _) = send(
            &app,
            "GET",
            "/api/news/AAPL?from=2024-01-02T00:00:00Z&to=2024-01-01T00:00:00Z",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rate_limited_requests() {
        let app = test_app(2);

        for _ in 0..2 {
            let (status, _) = send(&app, "GET", "/api/news/AAPL").await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, body) = send(&app, "GET", "/api/news/AAPL").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(body["error"].as_str().unwrap().contains("AAPL"));
    }

    #[tokio::test]
    async fn test_manual_refresh() {
        let app = test_app(10);

        let (status, body) = send(&app, "POST", "/api/admin/refresh").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cached_items"], 2);
        assert_eq!(body["cache"]["refresh_count"], 1);
    }
}
