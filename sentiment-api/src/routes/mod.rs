//! API route definitions

mod health;
mod news;
mod sentiment;

use axum::Router;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::AppState;

/// Default lookback when a query gives no `from`
const DEFAULT_LOOKBACK_HOURS: i64 = 24;

/// Create all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(news::routes())
        .merge(sentiment::routes())
        .merge(health::routes())
}

/// Query window shared by the news and sentiment endpoints (RFC 3339)
#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl WindowQuery {
    /// `to` defaults to now, `from` to 24 hours before `to`
    pub fn resolve(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let to = self.to.unwrap_or_else(Utc::now);
        let from = self
            .from
            .unwrap_or_else(|| to - Duration::hours(DEFAULT_LOOKBACK_HOURS));
        (from, to)
    }
}
