//! News Sentiment Feed API Server
//!
//! HTTP API server exposing per-symbol news and sentiment scores.

mod routes;

use axum::{
    http::{header, Method},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use sentiment_news::{HttpNewsSource, NewsSource, StaticNewsSource};
use sentiment_services::{NewsFeedConfig, NewsFeedService};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub news_feed: Arc<NewsFeedService>,
}

/// Pick the upstream feed from the environment
fn news_source_from_env() -> anyhow::Result<Arc<dyn NewsSource>> {
    if let Ok(feed_url) = std::env::var("NEWS_FEED_URL") {
        info!("Using HTTP news feed at {}", feed_url);
        let api_key = std::env::var("NEWS_FEED_API_KEY").ok();
        return Ok(Arc::new(HttpNewsSource::new(&feed_url, api_key)?));
    }

    if let Ok(path) = std::env::var("NEWS_FIXTURE_PATH") {
        info!("Using static news fixture at {}", path);
        let json = std::fs::read_to_string(&path)?;
        return Ok(Arc::new(StaticNewsSource::from_json(&json)?));
    }

    warn!("No NEWS_FEED_URL or NEWS_FIXTURE_PATH set - serving an empty news feed");
    Ok(Arc::new(StaticNewsSource::default()))
}

/// Build the router with all API routes mounted under `/api`
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .nest("/api", routes::api_routes())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sentiment_api=debug")),
        )
        .init();

    info!("Starting News Sentiment Feed API");

    let config = NewsFeedConfig::from_env()?;
    let source = news_source_from_env()?;
    let news_feed = Arc::new(NewsFeedService::new(source, config));

    // Warm the cache so the first request doesn't pay for the fetch
    match news_feed.refresh_now().await {
        Ok(count) => info!("Initial news refresh cached {} articles", count),
        Err(e) => warn!("Initial news refresh failed, will retry on demand: {}", e),
    }

    let app = app(AppState { news_feed });

    // Start server
    let port = std::env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
