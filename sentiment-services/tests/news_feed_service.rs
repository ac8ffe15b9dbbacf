//! Service-level behavior against scripted upstream feeds
//!
//! Run with: cargo test -p sentiment-services --test news_feed_service

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sentiment_core::RawArticle;
use sentiment_news::{NewsError, NewsSource};
use sentiment_services::{
    NeutralReason, NewsCache, NewsFeedConfig, NewsFeedError, NewsFeedService, RefreshOutcome,
    SentimentReading,
};

type BatchFn = dyn Fn(usize) -> Vec<RawArticle> + Send + Sync;

/// Upstream whose batch depends on how many fetches came before
struct ScriptedSource {
    batch: Box<BatchFn>,
    fetches: AtomicUsize,
    failing: AtomicBool,
    latency: StdDuration,
}

impl ScriptedSource {
    fn new(batch: impl Fn(usize) -> Vec<RawArticle> + Send + Sync + 'static) -> Self {
        Self {
            batch: Box::new(batch),
            fetches: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            latency: StdDuration::ZERO,
        }
    }

    fn with_latency(mut self, latency: StdDuration) -> Self {
        self.latency = latency;
        self
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl NewsSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_batch(&self) -> Result<Vec<RawArticle>, NewsError> {
        let fetch = self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(NewsError::RequestFailed("connection reset".to_string()));
        }
        Ok((self.batch)(fetch))
    }
}

fn article(id: &str, symbols: &[&str], published_at: DateTime<Utc>, score: f64) -> RawArticle {
    RawArticle {
        id: Some(id.to_string()),
        title: Some(format!("Headline {}", id)),
        url: Some(format!("https://news.example.com/{}", id)),
        source: Some("Example Wire".to_string()),
        published_at: Some(published_at.to_rfc3339()),
        sentiment_score: Some(score),
        sentiment_confidence: Some(0.75),
        related_symbols: symbols.iter().map(|s| s.to_string()).collect(),
        ..RawArticle::default()
    }
}

fn config(ttl: Duration, rate_limit_per_second: u32) -> NewsFeedConfig {
    NewsFeedConfig {
        cache_ttl: ttl,
        rate_limit_per_second,
        ..NewsFeedConfig::default()
    }
}

#[tokio::test]
async fn stale_cache_survives_upstream_failure() {
    let published = Utc::now() - Duration::hours(1);
    let source = Arc::new(ScriptedSource::new(move |_| {
        vec![article("a1", &["AAPL"], published, 0.5)]
    }));
    // Zero TTL makes every request try to refresh
    let service = NewsFeedService::new(source.clone(), config(Duration::zero(), 100));

    let now = Utc::now();
    let window = (now - Duration::days(1), now);
    let before = service.get_sentiment_score("AAPL", window.0, window.1).await;
    assert!((before - 0.5).abs() < 1e-9);

    source.set_failing(true);
    tokio::time::sleep(StdDuration::from_millis(5)).await;

    let after = service.get_sentiment_score("AAPL", window.0, window.1).await;
    assert_eq!(before, after);

    let items = service
        .get_news_for_symbol("AAPL", window.0, window.1)
        .await
        .expect("refresh failure must not fail the read");
    assert_eq!(items.len(), 1);

    let stats = service.cache_stats();
    assert_eq!(stats.refresh_count, 1);
    assert!(stats.failed_refresh_count >= 1);

    assert!(matches!(
        service.refresh_now().await,
        Err(NewsFeedError::Refresh(NewsError::RequestFailed(_)))
    ));
}

#[tokio::test]
async fn failed_first_refresh_serves_empty() {
    let source = Arc::new(ScriptedSource::new(|_| Vec::new()));
    source.set_failing(true);
    let service = NewsFeedService::new(source, NewsFeedConfig::default());

    let now = Utc::now();
    let reading = service
        .evaluate_sentiment("AAPL", now - Duration::hours(4), now)
        .await;
    assert_eq!(reading, SentimentReading::Neutral(NeutralReason::NoArticles));

    let items = service
        .get_news_for_symbol("AAPL", now - Duration::hours(4), now)
        .await
        .unwrap();
    assert!(items.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_stale_requests_fetch_once() {
    let published = Utc::now() - Duration::hours(2);
    let source = Arc::new(
        ScriptedSource::new(move |_| vec![article("a1", &["AAPL", "MSFT"], published, 0.4)])
            .with_latency(StdDuration::from_millis(200)),
    );
    let service = Arc::new(NewsFeedService::new(
        source.clone(),
        config(Duration::minutes(5), 100),
    ));

    let now = Utc::now();
    let mut handles = Vec::new();
    for i in 0..16 {
        let service = Arc::clone(&service);
        let symbol = if i % 2 == 0 { "AAPL" } else { "MSFT" };
        handles.push(tokio::spawn(async move {
            service
                .get_sentiment_score(symbol, now - Duration::days(1), now)
                .await
        }));
    }

    for handle in handles {
        let score = handle.await.unwrap();
        assert!((score - 0.4).abs() < 1e-9);
    }
    assert_eq!(source.fetches(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_stale_requests_share_a_failed_fetch() {
    let source = Arc::new(
        ScriptedSource::new(|_| Vec::new()).with_latency(StdDuration::from_millis(200)),
    );
    source.set_failing(true);
    let service = Arc::new(NewsFeedService::new(
        source.clone(),
        config(Duration::minutes(5), 100),
    ));

    let now = Utc::now();
    let mut handles = Vec::new();
    for _ in 0..16 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service
                .get_sentiment_score("AAPL", now - Duration::hours(1), now)
                .await
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), 0.0);
    }
    assert_eq!(source.fetches(), 1);
    assert_eq!(service.cache_stats().failed_refresh_count, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn waiters_receive_the_shared_refresh_error() {
    let source = Arc::new(
        ScriptedSource::new(|_| Vec::new()).with_latency(StdDuration::from_millis(200)),
    );
    source.set_failing(true);
    let cache = Arc::new(NewsCache::new(
        source.clone(),
        NewsFeedConfig::default().limits,
        10_000,
    ));

    let now = Utc::now();
    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = Arc::clone(&cache);
        handles.push(tokio::spawn(async move {
            cache.refresh_if_stale(now, Duration::minutes(5)).await
        }));
    }

    for handle in handles {
        assert!(matches!(
            handle.await.unwrap(),
            Err(NewsError::RequestFailed(_))
        ));
    }
    assert_eq!(source.fetches(), 1);

    // Once the upstream recovers, the next stale trigger fetches again
    source.set_failing(false);
    assert_eq!(
        cache.refresh_if_stale(Utc::now(), Duration::minutes(5)).await.unwrap(),
        RefreshOutcome::Refreshed(0)
    );
    assert_eq!(source.fetches(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_never_see_partial_refresh() {
    const PER_SYMBOL: usize = 200;
    let published = Utc::now() - Duration::hours(1);
    let source = Arc::new(ScriptedSource::new(move |generation| {
        (0..PER_SYMBOL)
            .flat_map(|i| {
                [
                    article(&format!("g{}-aapl-{}", generation, i), &["AAPL"], published, 0.1),
                    article(&format!("g{}-msft-{}", generation, i), &["MSFT"], published, -0.1),
                ]
            })
            .collect()
    }));
    let cache = Arc::new(NewsCache::new(
        source.clone(),
        NewsFeedConfig::default().limits,
        10_000,
    ));
    cache.refresh().await.unwrap();

    let writer = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            for _ in 0..50 {
                cache.refresh().await.unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    let mut readers = Vec::new();
    for _ in 0..4 {
        let cache = Arc::clone(&cache);
        readers.push(tokio::spawn(async move {
            let from = Utc::now() - Duration::days(1);
            for _ in 0..500 {
                let to = Utc::now();
                for symbol in ["AAPL", "MSFT"] {
                    let items = cache.lookup(symbol, from, to);
                    assert_eq!(items.len(), PER_SYMBOL);
                    let generation = format!("{}-", items[0].id.split('-').next().unwrap());
                    assert!(items.iter().all(|item| item.id.starts_with(&generation)));
                }
                tokio::task::yield_now().await;
            }
        }));
    }

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }
    assert_eq!(source.fetches(), 51);
}

#[tokio::test]
async fn news_queries_are_throttled_per_symbol() {
    let published = Utc::now() - Duration::hours(1);
    let source = Arc::new(ScriptedSource::new(move |_| {
        vec![article("a1", &["AAPL", "MSFT"], published, 0.2)]
    }));
    let service = NewsFeedService::new(source, config(Duration::minutes(5), 3));

    let now = Utc::now();
    let from = now - Duration::days(1);

    let mut outcomes = Vec::new();
    for _ in 0..5 {
        outcomes.push(service.get_news_for_symbol("AAPL", from, now).await);
    }
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 3);
    assert!(outcomes[3..]
        .iter()
        .all(|r| matches!(r, Err(NewsFeedError::RateLimited { symbol }) if symbol == "AAPL")));

    // Another symbol in the same window is unaffected
    assert_eq!(
        service.get_news_for_symbol("MSFT", from, now).await.unwrap().len(),
        1
    );

    // Sentiment queries do not consult the limiter
    for _ in 0..10 {
        assert!((service.get_sentiment_score("AAPL", from, now).await - 0.2).abs() < 1e-9);
    }
    let stats = service.rate_limiter_stats();
    assert_eq!(stats.admitted, 4);
    assert_eq!(stats.rejected, 2);
}

#[tokio::test]
async fn sentiment_is_deterministic_for_a_fixed_snapshot() {
    let now = Utc::now();
    let source = Arc::new(ScriptedSource::new(move |_| {
        vec![
            article("1", &["NVDA"], now - Duration::hours(1), 0.9),
            article("2", &["NVDA"], now - Duration::hours(3), -0.3),
            article("3", &["NVDA"], now - Duration::hours(7), 0.1),
        ]
    }));
    let service = NewsFeedService::new(source, NewsFeedConfig::default());

    let from = now - Duration::hours(12);
    let first = service.get_sentiment_score("NVDA", from, now).await;
    let second = service.get_sentiment_score("NVDA", from, now).await;
    assert_eq!(first, second);
    assert!((-1.0..=1.0).contains(&first));

    // More recent positive news dominates the older negative item
    assert!(first > 0.0);
}
