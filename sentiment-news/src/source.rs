//! The upstream feed boundary

use async_trait::async_trait;
use sentiment_core::RawArticle;

use crate::error::NewsError;

/// A remote provider of news articles.
///
/// One call returns the provider's current batch. Records are returned
/// unvalidated; callers are responsible for bounds checks.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Name for logging purposes
    fn name(&self) -> &str;

    /// Fetch the current batch of articles
    async fn fetch_batch(&self) -> Result<Vec<RawArticle>, NewsError>;
}
