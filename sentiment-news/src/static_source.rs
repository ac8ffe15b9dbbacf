//! Fixed in-memory article batch

use async_trait::async_trait;
use sentiment_core::RawArticle;

use crate::error::NewsError;
use crate::source::NewsSource;

/// Serves the same batch on every fetch
#[derive(Debug, Clone, Default)]
pub struct StaticNewsSource {
    articles: Vec<RawArticle>,
}

impl StaticNewsSource {
    pub fn new(articles: Vec<RawArticle>) -> Self {
        Self { articles }
    }

    /// Load a batch from a JSON array of articles
    pub fn from_json(json: &str) -> Result<Self, NewsError> {
        let articles =
            serde_json::from_str(json).map_err(|e| NewsError::ParseError(e.to_string()))?;
        Ok(Self::new(articles))
    }
}

#[async_trait]
impl NewsSource for StaticNewsSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_batch(&self) -> Result<Vec<RawArticle>, NewsError> {
        Ok(self.articles.clone())
    }
}
