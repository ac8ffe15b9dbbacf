//! JSON news feed client
//!
//! Fetches the provider's current article batch over HTTP. The provider may
//! answer with a bare array of articles or an object wrapping them.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

use sentiment_core::RawArticle;

use crate::error::NewsError;
use crate::source::NewsSource;

/// Default request timeout for a batch fetch
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedResponse {
    Bare(Vec<RawArticle>),
    Wrapped { articles: Vec<RawArticle> },
}

impl FeedResponse {
    fn into_articles(self) -> Vec<RawArticle> {
        match self {
            FeedResponse::Bare(articles) => articles,
            FeedResponse::Wrapped { articles } => articles,
        }
    }
}

/// HTTP client for a JSON article feed
pub struct HttpNewsSource {
    client: Client,
    feed_url: Url,
    api_key: Option<String>,
}

impl HttpNewsSource {
    /// Create a client for `feed_url` with the default timeout
    pub fn new(feed_url: &str, api_key: Option<String>) -> Result<Self, NewsError> {
        Self::with_timeout(feed_url, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        feed_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, NewsError> {
        let feed_url = Url::parse(feed_url)
            .map_err(|e| NewsError::InvalidConfig(format!("feed url `{}`: {}", feed_url, e)))?;
        if !matches!(feed_url.scheme(), "http" | "https") {
            return Err(NewsError::InvalidConfig(format!(
                "feed url must be http or https, got `{}`",
                feed_url.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NewsError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            feed_url,
            api_key,
        })
    }
}

#[async_trait]
impl NewsSource for HttpNewsSource {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self), fields(url = %self.feed_url))]
    async fn fetch_batch(&self) -> Result<Vec<RawArticle>, NewsError> {
        let mut request = self.client.get(self.feed_url.clone());
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NewsError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NewsError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| NewsError::RequestFailed(e.to_string()))?;
        debug!("Received {} bytes from news feed", body.len());

        let articles = serde_json::from_str::<FeedResponse>(&body)
            .map_err(|e| NewsError::ParseError(e.to_string()))?
            .into_articles();

        info!("Fetched {} articles from {}", articles.len(), self.feed_url);
        Ok(articles)
    }
}
