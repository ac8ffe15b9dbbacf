//! Health check endpoints

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;

use sentiment_services::{NewsCacheStats, RateLimiterStats};

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    cache: NewsCacheStats,
    rate_limiter: RateLimiterStats,
}

/// Health check handler. Degraded until the first successful refresh.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let cache = state.news_feed.cache_stats();
    let status = if cache.last_refresh.is_some() {
        "healthy"
    } else {
        "degraded"
    };

    let response = HealthResponse {
        status: status.to_string(),
        cache,
        rate_limiter: state.news_feed.rate_limiter_stats(),
    };

    (StatusCode::OK, Json(response))
}

/// Simple liveness check (always returns OK if server is running)
async fn liveness() -> &'static str {
    "OK"
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
}
